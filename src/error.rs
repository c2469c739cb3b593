//! Error types for the multiplication table trainer

use thiserror::Error;

/// Infrastructure failures. Bad user input and missing counters are data,
/// never errors.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Schema migration error
    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// A stored or supplied date that is not `YYYY-MM-DD`
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
