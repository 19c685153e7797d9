//! Station List
//!
//! The receiver's playlist: a flat, name-sorted list of stations backed
//! by the station store, with remote catalog merging and rate-limited
//! now-playing polling. Outcomes are reported as [`ReceiverMessage`]s
//! for the receiver to act on and forward.

use std::time::{Duration, Instant};

use boombox_core::media::ContentHandle;
use boombox_core::source::ReceiverMessage;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::Result;
use crate::now_playing::{self, NowPlayingParser};
use crate::store::StationStore;
use crate::types::{Station, StationsConfig};

/// Persisted station list with a playback cursor
pub struct StationList {
    entries: Vec<Station>,
    cursor: usize,
    store: StationStore,
    http: Client,
    catalog_url: String,
    fetch_interval: Duration,
    last_fetch: Option<Instant>,
    no_fetch_metadata: bool,
}

impl StationList {
    /// Create a list over its store
    pub fn new(store: StationStore, config: StationsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Boombox/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            entries: Vec::new(),
            cursor: 0,
            store,
            http,
            catalog_url: config.catalog_url,
            fetch_interval: config.fetch_metadata_interval,
            last_fetch: None,
            no_fetch_metadata: false,
        })
    }

    /// Load the list from the store
    pub async fn load(&mut self) -> Result<ReceiverMessage> {
        self.entries = self.store.all().await?;
        Ok(ReceiverMessage::Loaded)
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor without announcing a selection
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position;
    }

    /// Move the cursor and announce the selection
    pub fn select(&mut self, position: usize) -> ReceiverMessage {
        self.cursor = position;
        ReceiverMessage::StationSelected { position }
    }

    /// The station under the cursor
    pub fn current(&self) -> Option<&Station> {
        self.entries.get(self.cursor)
    }

    /// The station at `position`
    pub fn entry(&self, position: usize) -> Option<&Station> {
        self.entries.get(position)
    }

    /// All stations, sorted by name
    pub fn entries(&self) -> &[Station] {
        &self.entries
    }

    /// Number of stations, soft-deleted ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no stations
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists at `position`
    pub fn entry_exists(&self, position: usize) -> bool {
        position < self.entries.len()
    }

    /// A station is playable when it has a stream address and is not
    /// soft-deleted
    pub fn is_entry_playable(&self, position: usize) -> bool {
        self.entries
            .get(position)
            .is_some_and(|s| !s.src.is_empty() && !s.deleted)
    }

    /// Stream address of a playable station
    pub fn src_of(&self, position: usize) -> Option<ContentHandle> {
        if !self.is_entry_playable(position) {
            return None;
        }
        self.entries
            .get(position)
            .map(|s| ContentHandle::new(s.src.clone()))
    }

    /// Position of a station by identifier
    pub fn position_by_id(&self, id: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| crate::error::StationError::NotFound(id.to_string()))
    }

    /// Advance the cursor to the next playable station
    ///
    /// On failure the cursor is past the end; the caller restores it.
    pub fn cursor_to_next_playable(&mut self) -> bool {
        loop {
            self.cursor += 1;
            if !self.entry_exists(self.cursor) {
                return false;
            }
            if self.is_entry_playable(self.cursor) {
                return true;
            }
        }
    }

    /// Step the cursor back to the previous playable station
    pub fn cursor_to_previous_playable(&mut self) -> bool {
        loop {
            if self.cursor == 0 {
                return false;
            }
            self.cursor -= 1;
            if self.is_entry_playable(self.cursor) {
                return true;
            }
        }
    }

    /// Merge the remote catalog into the store and reload
    ///
    /// Playback is stopped first. Merge rules: a user-modified local
    /// record is never touched; a soft-deleted local record keeps its
    /// flag but takes the remote fields; a remote record flagged deleted
    /// is never materialized locally; everything else is upserted. A
    /// failed fetch is logged and the list is still reloaded.
    pub async fn update_from_remote(&mut self) -> Result<Vec<ReceiverMessage>> {
        let mut messages = vec![ReceiverMessage::Stop];
        match self.fetch_catalog().await {
            Ok(catalog) => self.merge_catalog(catalog).await?,
            Err(error) => warn!(url = %self.catalog_url, %error, "catalog fetch failed"),
        }
        messages.push(self.load().await?);
        Ok(messages)
    }

    /// Add or replace a station, stopping playback first
    pub async fn add_entry(&mut self, station: Station) -> Result<Vec<ReceiverMessage>> {
        let mut messages = vec![ReceiverMessage::Stop];
        self.store.upsert(&station).await?;
        messages.push(self.load().await?);
        Ok(messages)
    }

    /// Soft-delete the station at `position`
    pub async fn delete_entry(&mut self, position: usize) -> Result<Vec<ReceiverMessage>> {
        if !self.is_entry_playable(position) {
            return Ok(Vec::new());
        }
        let mut station = self.entries[position].clone();
        station.deleted = true;
        self.store.upsert(&station).await?;
        Ok(vec![self.load().await?])
    }

    /// Poll the current station's now-playing metadata
    ///
    /// Unforced calls are rate-limited and suppressed entirely while the
    /// failure latch is set; a forced call clears both. Stations without
    /// a strategy report a placeholder instead of fetching. The title is
    /// only applied when the cursor has not moved since the fetch began;
    /// with the exclusive borrow held across the fetch the cursor cannot
    /// move mid-poll, so that check only matters to a detached polling
    /// task.
    pub async fn refresh_metadata(&mut self, forced: bool) -> Vec<ReceiverMessage> {
        if forced {
            self.last_fetch = None;
            self.no_fetch_metadata = false;
        }
        if self.no_fetch_metadata {
            return Vec::new();
        }
        let Some(station) = self.current().cloned() else {
            return Vec::new();
        };
        let Some(parser) = station
            .now_playing_parser
            .as_deref()
            .and_then(NowPlayingParser::from_name)
        else {
            return vec![ReceiverMessage::Metadata {
                title: format!("{}: the programme title is not provided", station.name),
            }];
        };

        if let Some(last) = self.last_fetch {
            if last.elapsed() < self.fetch_interval {
                return Vec::new();
            }
        }
        self.last_fetch = Some(Instant::now());

        let url = match now_playing::request_url(parser, &station) {
            Ok(url) => url,
            Err(error) => {
                warn!(station = %station.name, %error, "no now-playing address");
                self.no_fetch_metadata = true;
                return vec![ReceiverMessage::MetadataError {
                    url: String::new(),
                    name: station.name,
                }];
            }
        };

        let initial = self.cursor;
        let body = match self.fetch_body(&url).await {
            Ok(body) => body,
            Err(error) => {
                warn!(%url, %error, "now-playing fetch failed");
                self.no_fetch_metadata = true;
                return vec![ReceiverMessage::MetadataError {
                    url,
                    name: station.name,
                }];
            }
        };
        if initial != self.cursor {
            debug!("cursor moved during now-playing fetch, dropping result");
            return Vec::new();
        }

        let title = now_playing::parse_body(parser, &station, &body);
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.title = Some(title.clone());
        }
        vec![ReceiverMessage::Metadata { title }]
    }

    async fn fetch_catalog(&self) -> Result<Vec<Station>> {
        let catalog = self
            .http
            .get(&self.catalog_url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Station>>()
            .await?;
        Ok(catalog)
    }

    async fn fetch_body(&self, url: &str) -> reqwest::Result<String> {
        self.http.get(url).send().await?.text().await
    }

    async fn merge_catalog(&mut self, catalog: Vec<Station>) -> Result<()> {
        for mut remote in catalog {
            let local = self.entries.iter().find(|e| e.id == remote.id);
            match local {
                // user edits win
                Some(existing) if existing.changed_by_user => continue,
                Some(existing) => {
                    if existing.deleted {
                        remote.deleted = true;
                    }
                    self.store.upsert(&remote).await?;
                }
                // never materialize a pre-deleted remote record
                None if remote.deleted => continue,
                None => self.store.upsert(&remote).await?,
            }
        }
        Ok(())
    }
}
