use crate::domain::TermId;
use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp for run log headers, e.g. "2025-12-16T10:30:00+00:00"
pub fn format_log_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Formats a timestamp for archive file names, e.g. "2025-12-16_103000"
pub fn format_file_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d_%H%M%S").to_string()
}

/// Splits a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a comma-separated list of category ids.
/// Entries that are not positive integers are dropped.
pub fn parse_id_list(input: &str) -> Vec<TermId> {
    split_list(input)
        .iter()
        .filter_map(|part| part.parse::<TermId>().ok())
        .filter(|id| *id > 0)
        .collect()
}

/// Normalizes free text into a URL-safe slug: lower-case ASCII letters,
/// digits and single hyphens
pub fn sanitize_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if (c == '-' || c == '_' || c.is_whitespace()) && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Sanitizes a string for use in a filename
/// Replaces invalid filename characters with hyphens
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
