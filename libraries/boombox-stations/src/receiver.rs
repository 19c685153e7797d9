//! Receiver Transport State Machine
//!
//! The network playback engine. Shares the deck's command discipline
//! (commands return immediately, definitive state is assigned on the
//! media primitive's confirmation, held in a [`Pending`] value) but over
//! a flat station list: there is no seekable position, so stopping
//! unloads the stream entirely, and the OS "pause" command unplugs the
//! source instead of pausing. A receiver is live by nature, so plugging
//! it in starts playback immediately.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use boombox_core::events::SourceEvent;
use boombox_core::graph::{AudioGraph, NodeRef};
use boombox_core::media::{MediaElement, MediaEvent};
use boombox_core::session::{
    DisplayMetadata, MediaAction, MediaSession, PlaybackIndication, PositionState,
};
use boombox_core::source::{ReceiverMessage, Source};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::Result;
use crate::stations::StationList;
use crate::types::Station;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Receiver transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// No stream loaded
    Stopped,
    /// A transition is awaiting confirmation
    Busy,
    /// A stream is playing
    Playing,
}

/// The confirmation a transport command is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    /// a pause confirmation substitutes the jump target
    LoadOnPause { position: usize, old_position: usize },
    /// a loaded-data confirmation starts playback
    PlayOnLoaded { position: usize, old_position: usize },
    /// a playing confirmation finalizes the play transition
    ConfirmPlay { position: usize, old_position: usize },
    /// a pause confirmation unloads the stream and finalizes a stop
    FinishStop,
}

/// Network playback source over a station list
pub struct Receiver {
    media: Box<dyn MediaElement>,
    stations: StationList,
    state: ReceiverState,
    pending: Pending,
    node: NodeRef,
    graph: Arc<Mutex<dyn AudioGraph>>,
    session: Box<dyn MediaSession>,
    events: broadcast::Sender<SourceEvent>,
}

impl Receiver {
    /// Create a receiver over its media primitive and station list
    pub fn new(
        media: Box<dyn MediaElement>,
        node: NodeRef,
        graph: Arc<Mutex<dyn AudioGraph>>,
        session: Box<dyn MediaSession>,
        stations: StationList,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            media,
            stations,
            state: ReceiverState::Stopped,
            pending: Pending::None,
            node,
            graph,
            session,
            events,
        }
    }

    /// Current transport state
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// The receiver's station list
    pub fn stations(&self) -> &StationList {
        &self.stations
    }

    /// Load the station list from the store
    pub async fn load(&mut self) -> Result<()> {
        let message = self.stations.load().await?;
        self.handle_playlist_message(message);
        Ok(())
    }

    /// Stop playback, then merge the remote catalog and reload the list
    pub async fn update_from_remote(&mut self) -> Result<()> {
        self.stop();
        let messages = self.stations.update_from_remote().await?;
        for message in messages {
            self.handle_playlist_message(message);
        }
        Ok(())
    }

    /// Stop playback, then add or replace a station
    pub async fn add_station(&mut self, station: Station) -> Result<()> {
        self.stop();
        let messages = self.stations.add_entry(station).await?;
        for message in messages {
            self.handle_playlist_message(message);
        }
        Ok(())
    }

    /// Soft-delete the station at `position`
    pub async fn delete_station(&mut self, position: usize) -> Result<()> {
        let messages = self.stations.delete_entry(position).await?;
        for message in messages {
            self.handle_playlist_message(message);
        }
        Ok(())
    }

    /// Begin playback of the cursor station
    pub fn play(&mut self) -> bool {
        if self.state != ReceiverState::Stopped {
            return false;
        }
        let position = self.stations.cursor();
        if !self.stations.is_entry_playable(position) {
            return false;
        }
        self.state = ReceiverState::Busy;
        self.pending = Pending::PlayOnLoaded {
            position,
            old_position: position,
        };
        self.load_station(position);
        true
    }

    /// Stop playback and unload the stream
    ///
    /// A stop already in flight rejects a second one.
    pub fn stop(&mut self) -> bool {
        if self.state == ReceiverState::Stopped || self.pending == Pending::FinishStop {
            return false;
        }
        self.state = ReceiverState::Busy;
        self.pending = Pending::FinishStop;
        if self.media.is_paused() {
            // no real pause transition will fire
            self.finish_stop();
        } else {
            self.media.pause();
        }
        true
    }

    /// Jump to the previous playable station
    pub fn previous(&mut self) -> bool {
        if self.state == ReceiverState::Stopped || self.stations.is_empty() {
            return false;
        }
        let old_position = self.stations.cursor();
        if !self.stations.cursor_to_previous_playable() {
            self.stations.set_cursor(old_position);
        }
        self.emit(SourceEvent::Previous {
            position: self.stations.cursor(),
        });
        self.jump_from(old_position);
        true
    }

    /// Jump to the next playable station
    pub fn next(&mut self) -> bool {
        if self.state == ReceiverState::Stopped || self.stations.is_empty() {
            return false;
        }
        let old_position = self.stations.cursor();
        if !self.stations.cursor_to_next_playable() {
            self.stations.set_cursor(old_position);
        }
        self.emit(SourceEvent::Next {
            position: self.stations.cursor(),
        });
        self.jump_from(old_position);
        true
    }

    /// Jump to an arbitrary playable station
    pub fn play_from_position(&mut self, position: usize) -> bool {
        if !self.stations.is_entry_playable(position) {
            return false;
        }
        let old_position = self.stations.cursor();
        self.emit(SourceEvent::Jump {
            position,
            old_position,
        });
        let message = self.stations.select(position);
        self.handle_playlist_message(message);
        self.jump_from(old_position);
        true
    }

    /// Advance the state machine with a media-primitive confirmation
    pub async fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Playing => {
                if let Pending::ConfirmPlay {
                    position,
                    old_position,
                } = self.pending
                {
                    self.pending = Pending::None;
                    self.state = ReceiverState::Playing;
                    self.update_playback_state();
                    self.emit(SourceEvent::Play {
                        position,
                        old_position,
                    });
                }
            }
            MediaEvent::Paused => {
                self.update_position_state();
                match self.pending {
                    Pending::LoadOnPause {
                        position,
                        old_position,
                    } => {
                        self.pending = Pending::PlayOnLoaded {
                            position,
                            old_position,
                        };
                        self.load_station(position);
                    }
                    Pending::FinishStop => self.finish_stop(),
                    _ => {}
                }
            }
            MediaEvent::LoadedData => {
                self.emit(SourceEvent::LoadedData {
                    position: self.stations.cursor(),
                });
                if let Pending::PlayOnLoaded {
                    position,
                    old_position,
                } = self.pending
                {
                    self.pending = Pending::ConfirmPlay {
                        position,
                        old_position,
                    };
                    if let Ok(mut graph) = self.graph.lock() {
                        graph.resume_if_suspended();
                    }
                    self.media.play();
                }
            }
            MediaEvent::LoadStart => {
                self.emit(SourceEvent::LoadStart {
                    position: self.stations.cursor(),
                });
                let messages = self.stations.refresh_metadata(true).await;
                for message in messages {
                    self.handle_playlist_message(message);
                }
            }
            MediaEvent::TimeUpdate { position: time } => {
                self.update_position_state();
                self.emit(SourceEvent::TimeUpdate {
                    position: self.stations.cursor(),
                    time,
                });
                if time > Duration::ZERO {
                    let messages = self.stations.refresh_metadata(false).await;
                    for message in messages {
                        self.handle_playlist_message(message);
                    }
                }
            }
            MediaEvent::Progress => {
                self.emit(SourceEvent::Progress {
                    position: self.stations.cursor(),
                });
            }
            MediaEvent::Error { code } => {
                self.emit(SourceEvent::TrackError {
                    position: self.stations.cursor(),
                    code,
                });
            }
            MediaEvent::Abort => {
                self.emit(SourceEvent::TrackAbort {
                    position: self.stations.cursor(),
                });
            }
            MediaEvent::Ended => {
                // live streams end only when the connection drops
                debug!("stream ended");
            }
        }
    }

    fn handle_playlist_message(&mut self, message: ReceiverMessage) {
        match message {
            ReceiverMessage::Loaded => self.emit(SourceEvent::Loaded),
            ReceiverMessage::Stop => {
                self.stop();
            }
            ReceiverMessage::Metadata { title } => {
                self.update_metadata();
                self.emit(SourceEvent::Metadata { title });
            }
            ReceiverMessage::MetadataError { url, name } => {
                self.emit(SourceEvent::MetadataError { url, name });
            }
            ReceiverMessage::StationSelected { position } => {
                self.emit(SourceEvent::StationSelected { position });
            }
        }
    }

    fn jump_from(&mut self, old_position: usize) {
        let position = self.stations.cursor();
        self.pending = Pending::LoadOnPause {
            position,
            old_position,
        };
        if self.media.is_paused() {
            self.update_position_state();
            self.pending = Pending::PlayOnLoaded {
                position,
                old_position,
            };
            self.load_station(position);
        } else {
            self.media.pause();
        }
    }

    /// Streams always reload; there is no position to resume
    fn load_station(&mut self, position: usize) {
        match self.stations.src_of(position) {
            Some(handle) => self.media.load(&handle),
            None => warn!("station {} has no stream address", position),
        }
    }

    fn finish_stop(&mut self) {
        self.pending = Pending::None;
        self.state = ReceiverState::Stopped;
        self.media.unload();
        self.update_playback_state();
        self.emit(SourceEvent::Stop {
            position: self.stations.cursor(),
            ended: false,
            playlist_ended: false,
            manual: true,
        });
    }

    fn current_metadata(&self) -> DisplayMetadata {
        match self.stations.current() {
            Some(station) => DisplayMetadata {
                title: station
                    .title
                    .clone()
                    .unwrap_or_else(|| station.name.clone()),
                artist: String::new(),
                album: String::new(),
            },
            None => DisplayMetadata::default(),
        }
    }

    fn update_metadata(&mut self) {
        let metadata = self.current_metadata();
        self.session.set_metadata(&metadata);
    }

    fn update_playback_state(&mut self) {
        let state = if self.media.is_paused() {
            PlaybackIndication::Paused
        } else {
            PlaybackIndication::Playing
        };
        self.session.set_playback_state(state);
    }

    fn update_position_state(&mut self) {
        let position = self.media.position();
        // live streams substitute elapsed time for the unknown duration
        let duration = self.media.duration().unwrap_or(position);
        self.session.set_position_state(Some(PositionState {
            duration,
            position,
            rate: 1.0,
        }));
    }

    fn handle_media_action(&mut self, action: MediaAction) {
        match action {
            // a stopped receiver treats the play command as a handoff
            // and unplugs itself
            MediaAction::Play => match self.state {
                ReceiverState::Stopped => self.plug_out(),
                ReceiverState::Playing => {
                    self.play();
                }
                ReceiverState::Busy => {}
            },
            // a stream has no resumable position, so pausing unplugs
            MediaAction::Pause => self.plug_out(),
            MediaAction::Stop => {
                self.stop();
            }
            MediaAction::PreviousTrack => {
                self.previous();
            }
            MediaAction::NextTrack => {
                self.next();
            }
            MediaAction::SeekBackward | MediaAction::SeekForward | MediaAction::SeekTo { .. } => {
                debug!("seek - unsupported action");
            }
        }
    }

    fn emit(&self, event: SourceEvent) {
        let _ = self.events.send(event);
    }
}

impl Source for Receiver {
    fn plug_in(&mut self) {
        self.play();
        self.session.attach();
    }

    fn plug_out(&mut self) {
        self.stop();
        self.session.detach();
    }

    fn node(&self) -> NodeRef {
        self.node
    }

    fn display_metadata(&self) -> DisplayMetadata {
        self.current_metadata()
    }

    fn media_action(&mut self, action: MediaAction) {
        self.handle_media_action(action);
    }

    fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.events.subscribe()
    }
}
