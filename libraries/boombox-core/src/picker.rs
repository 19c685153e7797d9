//! Content Selection
//!
//! File and directory pickers are external collaborators; the deck
//! playlist only consumes their results. A directory selection is walked
//! through [`DirectoryHandle`] without the playlist knowing anything about
//! the underlying filesystem.

use async_trait::async_trait;
use thiserror::Error;

use crate::media::ContentHandle;

/// Content selection failures
#[derive(Error, Debug)]
pub enum PickError {
    /// The user dismissed the selection dialog
    #[error("selection cancelled")]
    Cancelled,

    /// The selection collaborator failed
    #[error("selection unavailable: {0}")]
    Unavailable(String),
}

/// A picked file: display name plus playable content handle
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub handle: ContentHandle,
}

/// One entry of a picked directory
pub enum PickedEntry {
    File(PickedFile),
    Directory(Box<dyn DirectoryHandle>),
}

impl std::fmt::Debug for PickedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(file) => f.debug_tuple("File").field(&file.name).finish(),
            Self::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
        }
    }
}

/// A picked directory that can enumerate its children
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// The directory's display name
    fn name(&self) -> &str;

    /// Enumerate the directory's immediate children
    ///
    /// # Errors
    /// Returns an error if the directory can no longer be read.
    async fn entries(&self) -> Result<Vec<PickedEntry>, PickError>;
}

/// The content-selection dialog collaborator
#[async_trait]
pub trait ContentPicker: Send + Sync {
    /// Let the user pick one or more files
    ///
    /// # Errors
    /// Fails with [`PickError::Cancelled`] when the user dismisses the
    /// dialog.
    async fn pick_files(&self) -> Result<Vec<PickedFile>, PickError>;

    /// Let the user pick a directory
    ///
    /// # Errors
    /// Fails with [`PickError::Cancelled`] when the user dismisses the
    /// dialog.
    async fn pick_directory(&self) -> Result<Box<dyn DirectoryHandle>, PickError>;
}
