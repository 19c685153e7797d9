//! Playback error types

use boombox_core::picker::PickError;
use thiserror::Error;

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Errors that can occur during playback operations
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A source name was not found in the device
    #[error("No source named \"{0}\"")]
    SourceNotFound(String),

    /// A component name was not found in the device
    #[error("No component named \"{0}\"")]
    ComponentNotFound(String),

    /// A selection contained no playable files
    #[error("No playable files selected")]
    NoPlayableFiles,

    /// Content selection failed
    #[error("Content selection failed: {0}")]
    Selection(#[from] PickError),
}
