/// Core error types for Boombox
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Boombox
#[derive(Error, Debug)]
pub enum CoreError {
    /// Named entity lookup failed (source, component, station)
    #[error("{entity} not found: {name}")]
    NotFound { entity: String, name: String },

    /// Media primitive errors
    #[error("Media error: {0}")]
    Media(String),

    /// Content selection errors
    #[error("Content selection error: {0}")]
    Selection(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            name: name.into(),
        }
    }

    /// Create a media error
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Create a content selection error
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection(msg.into())
    }
}
