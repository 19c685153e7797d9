//! Boombox Core
//!
//! Platform-agnostic types, traits, events, and error handling for
//! Boombox.
//!
//! Boombox switches between interchangeable playback sources (a local-file
//! Deck and a network Receiver) that share one downstream processing
//! chain. This crate defines the contracts the engines in
//! `boombox-playback` and `boombox-stations` implement against:
//!
//! # Architecture
//!
//! - **Source Contract**: [`Source`] plus the closed playlist-to-source
//!   message protocols [`DeckMessage`] and [`ReceiverMessage`]
//! - **Media Primitive**: [`MediaElement`] commands with asynchronous
//!   [`MediaEvent`] confirmations
//! - **OS Media Controls**: [`MediaSession`] publishing and the
//!   [`MediaAction`] command set
//! - **Audio Graph**: [`AudioGraph`] wiring over opaque [`NodeRef`]s
//! - **Content Selection**: [`ContentPicker`] / [`DirectoryHandle`]
//! - **Events**: [`SourceEvent`] and [`DeviceEvent`]
//!
//! # Example
//!
//! ```rust
//! use boombox_core::media::ContentHandle;
//! use boombox_core::session::{DisplayMetadata, MediaAction};
//!
//! let handle = ContentHandle::new("https://radio.example/stream");
//! assert_eq!(handle.as_str(), "https://radio.example/stream");
//!
//! let metadata = DisplayMetadata {
//!     title: "Morning Programme".to_string(),
//!     ..DisplayMetadata::default()
//! };
//! assert_eq!(metadata.artist, "");
//!
//! let action = MediaAction::Play;
//! assert_ne!(action, MediaAction::Stop);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod graph;
pub mod media;
pub mod picker;
pub mod session;
pub mod source;
pub mod tags;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use events::{DeviceEvent, SourceEvent};
pub use graph::{AudioComponent, AudioGraph, NodeRef};
pub use media::{ContentHandle, DurationProbe, MediaElement, MediaErrorCode, MediaEvent};
pub use picker::{ContentPicker, DirectoryHandle, PickError, PickedEntry, PickedFile};
pub use session::{
    DisplayMetadata, MediaAction, MediaSession, NoopMediaSession, PlaybackIndication,
    PositionState,
};
pub use source::{DeckMessage, ReceiverMessage, Source};
pub use tags::{TagRequest, TagResponse, TrackTags};
