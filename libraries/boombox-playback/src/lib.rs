//! Boombox - Playback Sources and Routing
//!
//! The playback half of Boombox: a deck for local files, the device that
//! routes sources through a shared processing chain, and the playlist
//! engine behind the deck's transport.
//!
//! This crate provides:
//! - Device routing (one active source over one component chain)
//! - Deck transport (play/pause/stop with asynchronous confirmations)
//! - Hierarchical playlist traversal (tracks and directories)
//! - Repeat modes (Default, RepeatTrack, RepeatDir, RepeatAll)
//! - Codec probing against the platform media primitive
//! - Background tag and duration enrichment of loaded playlists
//!
//! # Architecture
//!
//! `boombox-playback` is completely platform-agnostic. The media
//! primitive, audio graph, media session, and content picker are all
//! traits from `boombox-core`; the host implements them and pumps
//! [`MediaEvent`](boombox_core::media::MediaEvent)s into the deck.
//! Transport commands return immediately and definitive state is only
//! assigned when the primitive confirms the transition.
//!
//! # Example: Building a Device
//!
//! ```rust,no_run
//! use boombox_playback::{Deck, DeckConfig, Device};
//! use boombox_core::graph::{AudioComponent, AudioGraph, NodeRef};
//! use boombox_core::media::{ContentHandle, DurationProbe, MediaElement};
//! use boombox_core::picker::ContentPicker;
//! use boombox_core::session::NoopMediaSession;
//! use boombox_core::source::Source;
//! use std::sync::{Arc, Mutex};
//!
//! # fn build(
//! #     media: Box<dyn MediaElement>,
//! #     graph: Arc<Mutex<dyn AudioGraph>>,
//! #     picker: Arc<dyn ContentPicker>,
//! #     probe: Arc<dyn DurationProbe>,
//! # ) -> boombox_playback::Result<()> {
//! let deck = Deck::new(
//!     media,
//!     NodeRef::new(1),
//!     Arc::clone(&graph),
//!     Box::new(NoopMediaSession),
//!     picker,
//!     probe,
//!     DeckConfig::default(),
//! );
//!
//! let sources: Vec<(String, Box<dyn Source>)> =
//!     vec![("deck".to_string(), Box::new(deck))];
//! let mut device = Device::new(sources, Vec::new(), graph, "deck")?;
//!
//! // Route a hardware key to the active source
//! use boombox_core::session::MediaAction;
//! device.media_action(MediaAction::NextTrack);
//! # Ok(())
//! # }
//! ```

pub mod codecs;
mod deck;
mod device;
mod error;
mod playlist;
pub mod types;

// Public exports
pub use deck::Deck;
pub use device::{Device, Subscription};
pub use error::{PlaybackError, Result};
pub use playlist::DeckPlaylist;
pub use types::{DeckConfig, EntryKind, PlaybackMode, PlaylistEntry, TransportState};
