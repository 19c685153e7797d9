//! Station error types

use thiserror::Error;

/// Result type for station operations
pub type Result<T> = std::result::Result<T, StationError>;

/// Errors that can occur during station operations
#[derive(Error, Debug)]
pub enum StationError {
    /// Underlying store failure
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Station identifier not present in the list
    #[error("No station with id \"{0}\"")]
    NotFound(String),

    /// Remote catalog fetch failure
    #[error("Catalog fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A now-playing request address could not be built
    #[error("No request address for \"{0}\"")]
    MissingAddress(String),

    /// Station record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
