//! Background Tag-Worker Protocol
//!
//! Tag extraction runs in an isolated task reached only via message
//! passing. The deck playlist sends one request per loaded playlist and
//! receives index-correlated responses as extraction progresses; there is
//! no shared state beyond the message payloads.

use serde::{Deserialize, Serialize};

use crate::media::ContentHandle;

/// Extracted tag metadata for one entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Requests sent to the tag worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagRequest {
    /// Extract tags for every file of a freshly loaded playlist
    ///
    /// Entry order matches the playlist's entry sequence; non-file entries
    /// are represented by `None` and produce no response.
    Playlist {
        entries: Vec<Option<ContentHandle>>,
    },
}

/// Responses received from the tag worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagResponse {
    /// Tags extracted for the entry at `index`
    Tags {
        index: usize,
        tags: TrackTags,
    },
}
