//! Source and Device Events
//!
//! Event-based communication for external collaborators (UI, visualizer,
//! OS media controls). Events are emitted at key points:
//! - Playlist lifecycle (open/loaded/cancelled)
//! - Transport changes (play/pause/stop/jump)
//! - Content progress (track changes, time updates, load milestones)
//! - Routing changes (source plugged in/out)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::media::MediaErrorCode;

/// Events emitted by a playback source (Deck or Receiver)
///
/// `position` fields carry the playlist cursor position the event refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceEvent {
    /// A content-selection dialog was opened
    Open,

    /// A playlist finished loading and is ready for playback
    Loaded,

    /// Content selection yielded nothing and no previous selection existed
    NotPicked,

    /// Content selection was cancelled while a previous selection existed
    Cancel {
        /// Reason reported by the selection collaborator
        reason: String,
    },

    /// The playlist was discarded after a fatal load condition
    ClosedByFallback,

    /// Playback started or resumed
    Play {
        /// Cursor position now playing
        position: usize,
        /// Cursor position before the transport command
        old_position: usize,
    },

    /// Playback paused
    PauseOn {
        position: usize,
    },

    /// Playback resumed from pause
    PauseOff {
        position: usize,
    },

    /// Playback stopped
    Stop {
        position: usize,
        /// The current item reached its natural end
        ended: bool,
        /// The whole playlist reached its end under default mode
        playlist_ended: bool,
        /// The stop was requested by a transport command
        manual: bool,
    },

    /// Recording was requested
    Record,

    /// The current item changed (cursor move or tag arrival for the live item)
    TrackChanged {
        position: usize,
    },

    /// An item's duration became known
    TrackTimeChanged {
        position: usize,
        /// Probed duration, zero when probing failed
        duration: Duration,
    },

    /// Periodic playback-position report
    TimeUpdate {
        position: usize,
        time: Duration,
    },

    /// The media primitive started loading content
    LoadStart {
        position: usize,
    },

    /// The media primitive buffered more content
    Progress {
        position: usize,
    },

    /// The media primitive finished loading enough to play
    LoadedData {
        position: usize,
    },

    /// The media primitive reported a fatal error for the current item
    TrackError {
        position: usize,
        code: MediaErrorCode,
    },

    /// Loading of the current item was aborted
    TrackAbort {
        position: usize,
    },

    /// The cursor moved forward (receiver navigation)
    Next {
        position: usize,
    },

    /// The cursor moved backward (receiver navigation)
    Previous {
        position: usize,
    },

    /// The cursor jumped to an arbitrary position
    Jump {
        position: usize,
        old_position: usize,
    },

    /// Now-playing metadata arrived for the current station
    Metadata {
        title: String,
    },

    /// A now-playing metadata fetch failed
    MetadataError {
        /// Address the fetch was issued against
        url: String,
        /// Display name of the station
        name: String,
    },

    /// A station became the current selection
    StationSelected {
        position: usize,
    },
}

/// Events emitted by the Device routing bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// A source was connected to the processing chain
    PlugIn {
        /// Previously active source, if any
        old_source: Option<String>,
        /// Newly active source
        new_source: String,
    },

    /// A source was disconnected from the processing chain
    PlugOut {
        /// Source that was disconnected
        old_source: String,
        /// Replacement source, absent for a bare plug-out
        new_source: Option<String>,
    },
}
