//! Run log assembly: header, one line per outcome, footer.

use crate::domain::{CategoryOutcome, CleanupRequest};
use crate::utils::format_log_timestamp;
use chrono::{DateTime, Utc};

/// Cache key holding the most recent run log.
pub const LAST_LOG_KEY: &str = "store_toolset_last_log";

const SEPARATOR: &str = "------------------------------------------------------------";

/// Joins the header, the outcome lines in request order and the footer.
/// Blank lines are dropped.
pub fn assemble(
    request: &CleanupRequest,
    outcomes: &[CategoryOutcome],
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> String {
    let term_ids = request
        .term_ids()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![
        format!("Store Toolset run started at {}", format_log_timestamp(started_at)),
        format!("Mode: {}", request.mode()),
        format!("Term IDs: {term_ids}"),
        SEPARATOR.to_string(),
    ];
    lines.extend(outcomes.iter().map(ToString::to_string));
    lines.push(SEPARATOR.to_string());
    lines.push(format!(
        "Store Toolset run finished at {}",
        format_log_timestamp(finished_at)
    ));

    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
