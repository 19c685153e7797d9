//! Source Contract
//!
//! The shared capability interface every playback source implements, plus
//! the closed playlist-to-source message protocols. Message kinds are
//! enums, so an out-of-contract message is unrepresentable rather than a
//! runtime violation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::events::SourceEvent;
use crate::graph::NodeRef;
use crate::session::{DisplayMetadata, MediaAction};

/// An interchangeable playback source (Deck or Receiver)
///
/// One instance per variant exists for the application's lifetime; the
/// Device decides which one is plugged into the shared processing chain.
pub trait Source: Send {
    /// Attach OS media-control hooks; called when the Device activates
    /// this source
    fn plug_in(&mut self);

    /// Detach OS media-control hooks and clear published metadata,
    /// playback and position state
    fn plug_out(&mut self);

    /// The source's processing-graph output node
    fn node(&self) -> NodeRef;

    /// Normalized display metadata for the current item
    fn display_metadata(&self) -> DisplayMetadata;

    /// Dispatch an OS media-control action
    ///
    /// Actions the source does not support are logged and ignored.
    fn media_action(&mut self, action: MediaAction);

    /// Subscribe to this source's event stream
    fn subscribe(&self) -> broadcast::Receiver<SourceEvent>;
}

/// Messages a deck playlist reports to its owning deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeckMessage {
    /// The playlist finished loading and holds a playable selection
    Loaded,

    /// An entry's metadata changed (background tag arrival)
    TrackChanged {
        index: usize,
    },

    /// An entry's duration was probed
    TrackTimeChanged {
        index: usize,
        /// Zero when the probe failed and the entry was flagged
        duration: Duration,
    },

    /// Selection yielded nothing and no previous selection existed
    NotPicked,

    /// Selection was cancelled while a previous selection existed
    Cancel {
        reason: String,
    },

    /// The load attempt ended with no playable files
    ClosedByFallback,
}

/// Messages a station list reports to its owning receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReceiverMessage {
    /// The station list was (re)loaded from the store
    Loaded,

    /// Playback must stop (remote merge about to rewrite the list)
    Stop,

    /// Now-playing metadata arrived for the current station
    Metadata {
        title: String,
    },

    /// A now-playing metadata fetch failed
    MetadataError {
        url: String,
        name: String,
    },

    /// The cursor selected a station
    StationSelected {
        position: usize,
    },
}
