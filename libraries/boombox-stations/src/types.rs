//! Station record and configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of a station's now-playing strategy
///
/// `title`, `artist`, and `bitrate` are dotted paths into the fetched
/// JSON document; a numeric segment indexes into an array. `url`
/// overrides the request address derived from the stream address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NowPlayingParams {
    pub url: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub bitrate: Option<String>,
}

/// One radio station
///
/// The record persisted in the station store and carried by the remote
/// catalog. `title` is the transient now-playing text and is never
/// persisted. Deletion is a soft flag so a later catalog merge cannot
/// resurrect a station the user removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Stable identifier, the store key
    pub id: String,
    /// Display name
    pub name: String,
    /// Stream address
    pub src: String,
    /// Current now-playing text
    #[serde(skip)]
    pub title: Option<String>,
    /// Name of the now-playing strategy, absent when the station does
    /// not publish programme data
    #[serde(default)]
    pub now_playing_parser: Option<String>,
    /// Strategy parameters
    #[serde(default)]
    pub now_playing_params: Option<NowPlayingParams>,
    /// Set when the user edited the record; catalog merges skip it
    #[serde(default)]
    pub changed_by_user: bool,
    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,
}

impl Station {
    /// Create a plain station without now-playing support
    pub fn new(id: impl Into<String>, name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            src: src.into(),
            title: None,
            now_playing_parser: None,
            now_playing_params: None,
            changed_by_user: false,
            deleted: false,
        }
    }
}

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// Address of the remote station catalog
    pub catalog_url: String,
    /// Minimum delay between unforced now-playing fetches
    pub fetch_metadata_interval: Duration,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            catalog_url: String::new(),
            fetch_metadata_interval: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_record_deserializes_with_defaults() {
        let station: Station = serde_json::from_str(
            r#"{"id": "r1", "name": "Radio One", "src": "http://radio.example/stream"}"#,
        )
        .unwrap();
        assert_eq!(station.id, "r1");
        assert!(!station.changed_by_user);
        assert!(!station.deleted);
        assert!(station.now_playing_parser.is_none());
    }

    #[test]
    fn test_catalog_record_with_parser_params() {
        let station: Station = serde_json::from_str(
            r#"{
                "id": "r2",
                "name": "Radio Two",
                "src": "http://radio.example/two",
                "nowPlayingParser": "jsonTagsParser",
                "nowPlayingParams": {"url": "http://radio.example/np.json", "title": "now.title"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            station.now_playing_parser.as_deref(),
            Some("jsonTagsParser")
        );
        let params = station.now_playing_params.unwrap();
        assert_eq!(params.title.as_deref(), Some("now.title"));
        assert!(params.artist.is_none());
    }

    #[test]
    fn test_transient_title_is_not_serialized() {
        let mut station = Station::new("r1", "Radio One", "http://radio.example/stream");
        station.title = Some("Song".to_string());
        let json = serde_json::to_string(&station).unwrap();
        assert!(!json.contains("Song"));
    }
}
