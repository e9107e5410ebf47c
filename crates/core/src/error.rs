//! Error types for the store toolset

use thiserror::Error;

/// Result type alias using ToolsetError
pub type Result<T> = std::result::Result<T, ToolsetError>;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const PERMISSION_DENIED: i32 = 4;
}

#[derive(Debug, Error)]
pub enum ToolsetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolsetError {
    /// Wraps an adapter-specific failure (database driver, serialization...).
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage(err.into())
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            Self::PermissionDenied(_) => exit_codes::PERMISSION_DENIED,
            Self::Storage(_) | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
