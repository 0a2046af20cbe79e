//! Error types for the Nachbarn calendar.

use thiserror::Error;

/// Errors that can occur in calendar operations.
#[derive(Error, Debug)]
pub enum NachbarnError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("No activity at table row {0}")]
    RowNotFound(u32),

    #[error("No activity is being edited")]
    NoEditOpen,
}

/// Result type alias for calendar operations.
pub type NachbarnResult<T> = Result<T, NachbarnError>;
