//! Store toolset core: bulk removal of products by category, with a dry-run
//! mode, an archived and cached run log, and per-user screen options.

pub mod admin;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod purge;
pub mod runlog;
pub mod settings;
pub mod utils;

pub use application::CleanupService;
pub use config::ToolsetConfig;
pub use domain::{CategoryOutcome, CategoryRecord, CategoryRef, CleanupRequest, RunLog, RunMode};
pub use error::{Result, ToolsetError};
