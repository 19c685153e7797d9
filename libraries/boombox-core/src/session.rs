//! OS Media-Control Session
//!
//! Sources publish normalized metadata, playback state, and position to the
//! operating system's media-control surface, and receive a closed set of
//! media-control actions back.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OS-level media-control actions a source must accept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaAction {
    Play,
    Pause,
    Stop,
    SeekBackward,
    SeekForward,
    SeekTo {
        position: Duration,
    },
    PreviousTrack,
    NextTrack,
}

/// Normalized display metadata for the current item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Playback indication published to the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackIndication {
    /// No source active
    None,
    Playing,
    Paused,
}

/// Position report published to the OS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// Total duration of the current item
    ///
    /// For live streams the source substitutes the current elapsed time,
    /// so this is always finite.
    pub duration: Duration,
    /// Current playback position
    pub position: Duration,
    /// Playback rate
    pub rate: f64,
}

/// OS media-session surface a source publishes through
pub trait MediaSession: Send {
    /// Attach the session hooks for this source
    fn attach(&mut self);

    /// Detach the hooks and clear metadata, playback and position state
    fn detach(&mut self);

    /// Publish the current item's display metadata
    fn set_metadata(&mut self, metadata: &DisplayMetadata);

    /// Publish the playing/paused indication
    fn set_playback_state(&mut self, state: PlaybackIndication);

    /// Publish (or clear) the position report
    fn set_position_state(&mut self, state: Option<PositionState>);
}

/// Media session that publishes nowhere
///
/// For composition roots without OS integration, and for tests.
#[derive(Debug, Default)]
pub struct NoopMediaSession;

impl MediaSession for NoopMediaSession {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn set_metadata(&mut self, _metadata: &DisplayMetadata) {}

    fn set_playback_state(&mut self, _state: PlaybackIndication) {}

    fn set_position_state(&mut self, _state: Option<PositionState>) {}
}
