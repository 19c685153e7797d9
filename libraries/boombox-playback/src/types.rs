//! Core types for deck playback

use boombox_core::media::ContentHandle;
use boombox_core::tags::TrackTags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deck transport state
///
/// `Busy` covers the window between a transport command and the media
/// primitive's asynchronous confirmation; transport calls arriving during
/// that window are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// Nothing playing, position at zero
    Stopped,
    /// A transition is awaiting confirmation
    Busy,
    /// Audio is playing
    Playing,
    /// Paused mid-track
    Paused,
}

/// End-of-track behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Advance through the playlist, stop at the end
    Default,
    /// Restart the finished track
    RepeatTrack,
    /// Stay within the finished track's directory
    RepeatDir,
    /// Advance through the playlist, restart from the top at the end
    RepeatAll,
}

impl Default for PlaybackMode {
    fn default() -> Self {
        Self::Default
    }
}

/// Kind of a playlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of the deck playlist
///
/// Entries form a single flat sequence encoding hierarchy through `level`
/// and `path` (a pre-order walk of the selected tree). A directory entry's
/// `path` includes its own name, so it equals the `path` of the files
/// directly inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Display name
    pub name: String,
    /// File or directory
    pub kind: EntryKind,
    /// Nesting depth, zero for a flat file selection
    pub level: usize,
    /// Ordered ancestor directory names
    pub path: Vec<String>,
    /// Playable content, absent for directories
    pub handle: Option<ContentHandle>,
    /// Set when the duration probe failed; excludes the entry from
    /// playable traversal
    pub error: bool,
    /// Background-extracted tag metadata
    pub tags: Option<TrackTags>,
    /// Probed duration
    pub duration: Option<Duration>,
}

impl PlaylistEntry {
    /// Create a file entry
    pub fn file(
        name: impl Into<String>,
        handle: ContentHandle,
        level: usize,
        path: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            level,
            path,
            handle: Some(handle),
            error: false,
            tags: None,
            duration: None,
        }
    }

    /// Create a directory entry
    pub fn directory(name: impl Into<String>, level: usize, path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            level,
            path,
            handle: None,
            error: false,
            tags: None,
            duration: None,
        }
    }
}

/// Deck configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Start playback as soon as a playlist loads
    pub autoplay: bool,
    /// Initial end-of-track behavior
    pub playback_mode: PlaybackMode,
    /// Skip applied by the seek-backward and seek-forward media actions
    pub seek_skip: Duration,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            playback_mode: PlaybackMode::Default,
            seek_skip: Duration::from_secs(5),
        }
    }
}
