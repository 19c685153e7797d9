//! Boombox - Receiver and Station Management
//!
//! The network half of Boombox: the receiver playback source, its
//! persisted station list, remote catalog merging, and now-playing
//! metadata polling.
//!
//! This crate provides:
//! - Receiver transport (play/stop over live streams, no seeking)
//! - Station store (SQLite, soft deletes, schema created on first open)
//! - Remote catalog merge that never overrides user edits or deletions
//! - Rate-limited now-playing polling with pluggable parser strategies
//!
//! # Architecture
//!
//! The receiver implements the same source contract as the deck and is
//! driven the same way: the host pumps
//! [`MediaEvent`](boombox_core::media::MediaEvent)s into
//! [`Receiver::handle_media_event`]. Station-list outcomes travel as
//! [`ReceiverMessage`](boombox_core::source::ReceiverMessage)s from the
//! list to the receiver, which acts on them and forwards them as source
//! events.
//!
//! # Example: Opening the Station List
//!
//! ```rust,no_run
//! use boombox_stations::{Receiver, StationList, StationStore, StationsConfig};
//! use boombox_core::graph::{AudioGraph, NodeRef};
//! use boombox_core::media::MediaElement;
//! use boombox_core::session::NoopMediaSession;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn open(
//! #     media: Box<dyn MediaElement>,
//! #     graph: Arc<Mutex<dyn AudioGraph>>,
//! # ) -> boombox_stations::Result<()> {
//! let (store, created) = StationStore::open("sqlite://boombox.db").await?;
//! let config = StationsConfig {
//!     catalog_url: "https://boombox.example/data/stations.json".to_string(),
//!     ..StationsConfig::default()
//! };
//! let list = StationList::new(store, config)?;
//!
//! let mut receiver = Receiver::new(
//!     media,
//!     NodeRef::new(2),
//!     graph,
//!     Box::new(NoopMediaSession),
//!     list,
//! );
//!
//! // A fresh store starts from the remote catalog
//! if created {
//!     receiver.update_from_remote().await?;
//! } else {
//!     receiver.load().await?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod now_playing;
mod receiver;
mod stations;
mod store;
pub mod types;

// Public exports
pub use error::{Result, StationError};
pub use now_playing::NowPlayingParser;
pub use receiver::{Receiver, ReceiverState};
pub use stations::StationList;
pub use store::StationStore;
pub use types::{NowPlayingParams, Station, StationsConfig};
