//! Ports: the narrow interfaces through which the core talks to the host store,
//! the durable log archive, the short-lived cache and the per-user settings.

use crate::domain::{CategoryRecord, CategoryRef, ProductId, TermId};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

pub use crate::error::Result;

pub type UserId = u64;

/// Host taxonomy (product categories).
pub trait CategoryRepository {
    /// Returns `None` when the category does not exist.
    fn get_category(&self, category: &CategoryRef) -> Result<Option<CategoryRecord>>;

    fn list_categories(&self, include_empty: bool) -> Result<Vec<CategoryRecord>>;
}

/// Host content store (products).
pub trait ProductRepository {
    /// Identifiers only. `include_all_statuses` also returns drafts, trashed items, etc.
    fn find_ids_by_category(
        &self,
        term_id: TermId,
        include_all_statuses: bool,
    ) -> Result<Vec<ProductId>>;

    /// Deletes the product for good, skipping any trash. `Ok(false)` when
    /// nothing was deleted.
    fn delete_permanently(&self, product_id: ProductId) -> Result<bool>;
}

/// Durable, file-backed copies of run logs.
pub trait LogArchive {
    /// Writes the log to a new file named after `started_at`. Never overwrites.
    fn archive(&self, started_at: DateTime<Utc>, contents: &str) -> Result<PathBuf>;

    /// Removes every archived log and the archive directory.
    fn purge(&self) -> Result<()>;
}

/// Short-lived key/value cache with expiry.
pub trait LogCache {
    fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Expired entries are reported as absent.
    fn fetch(&self, key: &str) -> Result<Option<String>>;

    fn delete(&self, key: &str) -> Result<()>;
}

/// Per-user settings (screen options).
pub trait SettingsStore {
    fn get_user_setting(&self, user: UserId, key: &str) -> Result<Option<String>>;

    fn set_user_setting(&self, user: UserId, key: &str, value: &str) -> Result<()>;

    fn delete_setting_for_all_users(&self, key: &str) -> Result<()>;
}

/// Capability and anti-forgery checks owned by the hosting request handler.
pub trait AccessPolicy {
    fn can_manage(&self, user: UserId) -> bool;

    fn verify_token(&self, action: &str, token: &str) -> bool;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
