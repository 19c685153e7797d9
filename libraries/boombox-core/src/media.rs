//! Media Primitive Abstraction
//!
//! The playback primitive (one per source) is modelled as a command surface
//! plus an asynchronous confirmation stream. Transport commands are
//! fire-and-forget; the host delivers lifecycle confirmations as
//! [`MediaEvent`]s which the owning source feeds into its state machine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Opaque handle to playable content (a picked file or a stream address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHandle(String);

impl ContentHandle {
    /// Wrap a content URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The underlying URI
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fatal media-primitive error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorCode {
    /// Loading was aborted by the host
    Aborted,
    /// A network failure interrupted loading
    Network,
    /// The content could not be decoded
    Decode,
    /// The content format is not supported
    SrcNotSupported,
}

/// Asynchronous lifecycle confirmations from the media primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Playback actually started
    Playing,
    /// Playback actually paused
    Paused,
    /// The current content reached its natural end
    Ended,
    /// Loading of new content started
    LoadStart,
    /// More content was buffered
    Progress,
    /// Enough content loaded to begin playback
    LoadedData,
    /// Periodic position report while playing
    TimeUpdate {
        position: Duration,
    },
    /// A fatal error occurred
    Error {
        code: MediaErrorCode,
    },
    /// Loading was aborted
    Abort,
}

/// The asynchronous playback primitive a source drives
///
/// Commands return immediately; the primitive confirms state changes by
/// emitting [`MediaEvent`]s on the host task queue. Queries reflect the
/// primitive's last known state synchronously.
pub trait MediaElement: Send {
    /// Substitute the loaded content and begin loading it
    fn load(&mut self, handle: &ContentHandle);

    /// Request playback; confirmed by [`MediaEvent::Playing`]
    fn play(&mut self);

    /// Request a pause; confirmed by [`MediaEvent::Paused`]
    fn pause(&mut self);

    /// Clear the loaded content entirely
    fn unload(&mut self);

    /// Seek to a position in the loaded content
    fn seek(&mut self, position: Duration);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Duration of the loaded content
    ///
    /// Returns `None` for live streams and content whose duration is not
    /// yet (or never) determinable.
    fn duration(&self) -> Option<Duration>;

    /// Whether the primitive is currently paused (or has nothing loaded)
    fn is_paused(&self) -> bool;

    /// Probe format support for a MIME type
    fn can_play(&self, mime: &str) -> bool;
}

/// Duration probing over a detached media primitive
///
/// Used by the deck playlist to annotate entries one by one after a load.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Probe the duration of one content item
    ///
    /// # Errors
    /// Returns an error if the content cannot be loaded far enough to
    /// report a duration; the caller flags the entry as errored.
    async fn probe(&self, handle: &ContentHandle) -> Result<Duration>;
}
