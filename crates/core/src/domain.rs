use crate::error::{Result, ToolsetError};
use crate::utils::sanitize_slug;
use chrono::{DateTime, Utc};
use std::fmt;

pub type TermId = u64;
pub type ProductId = u64;

/// A product category as stored by the host taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub term_id: TermId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    /// Host-maintained member count. Advisory only, it can be stale.
    pub count: u64,
}

/// How a caller refers to a category: by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(TermId),
    Slug(String),
}

impl CategoryRef {
    /// Parses a positive integer as an id and any other non-empty text as a slug.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ToolsetError::InvalidInput(
                "category reference is empty".to_string(),
            ));
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return match trimmed.parse::<TermId>() {
                Ok(0) | Err(_) => Err(ToolsetError::InvalidInput(format!(
                    "category id must be a positive integer: {trimmed}"
                ))),
                Ok(id) => Ok(CategoryRef::Id(id)),
            };
        }

        let slug = sanitize_slug(trimmed);
        if slug.is_empty() {
            return Err(ToolsetError::InvalidInput(format!(
                "category slug is empty after sanitizing: {trimmed}"
            )));
        }
        Ok(CategoryRef::Slug(slug))
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRef::Id(id) => write!(f, "{id}"),
            CategoryRef::Slug(slug) => f.write_str(slug),
        }
    }
}

/// The categories to clean up and whether to only simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRequest {
    term_ids: Vec<TermId>,
    dry_run: bool,
}

impl CleanupRequest {
    /// Drops zero ids and duplicates (first occurrence wins).
    /// Fails with `InvalidInput` when nothing is left.
    pub fn new(term_ids: impl IntoIterator<Item = TermId>, dry_run: bool) -> Result<Self> {
        let mut unique: Vec<TermId> = Vec::new();
        for id in term_ids {
            if id != 0 && !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            return Err(ToolsetError::InvalidInput(
                "no category identifiers supplied".to_string(),
            ));
        }

        Ok(Self {
            term_ids: unique,
            dry_run,
        })
    }

    pub fn term_ids(&self) -> &[TermId] {
        &self.term_ids
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Live,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => f.write_str("DRY RUN"),
            RunMode::Live => f.write_str("LIVE"),
        }
    }
}

/// Result for a single requested category. Rendered as one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    Invalid {
        term_id: TermId,
    },
    /// The category exists but its products could not be listed.
    Unreadable {
        name: String,
        term_id: TermId,
    },
    Simulated {
        name: String,
        term_id: TermId,
        found: usize,
    },
    Deleted {
        name: String,
        term_id: TermId,
        found: usize,
        deleted: usize,
        failed: Vec<ProductId>,
    },
}

impl CategoryOutcome {
    pub fn term_id(&self) -> TermId {
        match self {
            CategoryOutcome::Invalid { term_id }
            | CategoryOutcome::Unreadable { term_id, .. }
            | CategoryOutcome::Simulated { term_id, .. }
            | CategoryOutcome::Deleted { term_id, .. } => *term_id,
        }
    }
}

impl fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryOutcome::Invalid { term_id } => {
                write!(f, "Invalid category identifier: {term_id}")
            }
            CategoryOutcome::Unreadable { name, term_id } => write!(
                f,
                "Category '{name}' (ID {term_id}) -> Products could not be listed (no deletions)"
            ),
            CategoryOutcome::Simulated {
                name,
                term_id,
                found,
            } => write!(
                f,
                "Category '{name}' (ID {term_id}) -> Products found: {found} (dry run, no deletions)"
            ),
            CategoryOutcome::Deleted {
                name,
                term_id,
                found,
                deleted,
                failed,
            } => {
                write!(
                    f,
                    "Category '{name}' (ID {term_id}) -> Products found: {found} (deleted: {deleted}"
                )?;
                if !failed.is_empty() {
                    write!(f, ", failed: {}", failed.len())?;
                }
                f.write_str(")")
            }
        }
    }
}

/// The assembled record of one cleanup invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: RunMode,
    pub outcomes: Vec<CategoryOutcome>,
    pub text: String,
}

impl RunLog {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Outcome lines only, without the timestamped header and footer.
    pub fn outcome_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
