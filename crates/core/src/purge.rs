//! Removes everything the toolset leaves behind: the cached log, the
//! per-user screen options and the archived run logs.

use crate::error::Result;
use crate::ports::{LogArchive, LogCache, SettingsStore};
use crate::runlog::LAST_LOG_KEY;
use crate::settings::{OPTION_KEY_COLUMNS, OPTION_KEY_PER_PAGE};
use tracing::info;

pub fn purge(
    cache: &dyn LogCache,
    settings: &dyn SettingsStore,
    archive: &dyn LogArchive,
) -> Result<()> {
    cache.delete(LAST_LOG_KEY)?;
    settings.delete_setting_for_all_users(OPTION_KEY_COLUMNS)?;
    settings.delete_setting_for_all_users(OPTION_KEY_PER_PAGE)?;
    archive.purge()?;
    info!("Store toolset data purged");
    Ok(())
}
