//! Per-user screen options for the category table.

use crate::error::Result;
use crate::ports::{SettingsStore, UserId};
use std::fmt;
use std::str::FromStr;

pub const OPTION_KEY_COLUMNS: &str = "store_toolset_columns";
pub const OPTION_KEY_PER_PAGE: &str = "store_toolset_per_page";

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MIN_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 200;

/// Optional columns a user may add to the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayColumn {
    Image,
    Description,
    Slug,
    Count,
}

impl DisplayColumn {
    pub const ALL: [DisplayColumn; 4] = [
        DisplayColumn::Image,
        DisplayColumn::Description,
        DisplayColumn::Slug,
        DisplayColumn::Count,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DisplayColumn::Image => "image",
            DisplayColumn::Description => "description",
            DisplayColumn::Slug => "slug",
            DisplayColumn::Count => "count",
        }
    }
}

impl fmt::Display for DisplayColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DisplayColumn {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        DisplayColumn::ALL
            .into_iter()
            .find(|column| column.key() == key)
            .ok_or(())
    }
}

/// Clamps a page size into the allowed range.
pub fn clamp_per_page(value: u32) -> u32 {
    value.clamp(MIN_PER_PAGE, MAX_PER_PAGE)
}

/// Reads a posted page size as an absolute integer. A sign is dropped and
/// oversized values saturate; `None` for anything that is not a number.
fn parse_page_size(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    pub columns: Vec<DisplayColumn>,
    pub per_page: u32,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ScreenOptions {
    /// Builds options from raw posted values. Unknown columns are dropped,
    /// a missing or unparsable page size falls back to the default, and the
    /// result is clamped.
    pub fn from_posted(columns: &[String], per_page: Option<&str>) -> Self {
        let mut chosen = Vec::new();
        for raw in columns {
            if let Ok(column) = raw.parse::<DisplayColumn>() {
                if !chosen.contains(&column) {
                    chosen.push(column);
                }
            }
        }

        let per_page = per_page
            .and_then(parse_page_size)
            .unwrap_or(DEFAULT_PER_PAGE);

        Self {
            columns: chosen,
            per_page: clamp_per_page(per_page),
        }
    }

    /// Loads a user's options, falling back to defaults for missing keys.
    pub fn load(store: &dyn SettingsStore, user: UserId) -> Result<Self> {
        let columns = store
            .get_user_setting(user, OPTION_KEY_COLUMNS)?
            .map(|raw| {
                raw.split(',')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let per_page = store.get_user_setting(user, OPTION_KEY_PER_PAGE)?;

        Ok(Self::from_posted(&columns, per_page.as_deref()))
    }

    pub fn save(&self, store: &dyn SettingsStore, user: UserId) -> Result<()> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.key())
            .collect::<Vec<_>>()
            .join(",");
        store.set_user_setting(user, OPTION_KEY_COLUMNS, &columns)?;
        store.set_user_setting(user, OPTION_KEY_PER_PAGE, &self.per_page.to_string())
    }

    pub fn shows(&self, column: DisplayColumn) -> bool {
        self.columns.contains(&column)
    }
}
