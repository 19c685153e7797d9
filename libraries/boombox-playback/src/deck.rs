//! Deck Transport State Machine
//!
//! The local-file playback engine. Transport commands return immediately
//! and the definitive state is assigned when the media primitive confirms
//! the transition; the one-shot completion chain of each command is held
//! in an explicit [`Pending`] value advanced by [`Deck::handle_media_event`],
//! so re-entrancy is gated by [`TransportState::Busy`] instead of listener
//! bookkeeping.
//!
//! For any jump or initial play the sequence is strictly ordered: pause
//! the current content (or synthesize the confirmation when already
//! paused), substitute and load the target, begin playback on the
//! loaded-data confirmation, and finalize state on the playing
//! confirmation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use boombox_core::events::SourceEvent;
use boombox_core::graph::{AudioGraph, NodeRef};
use boombox_core::media::{ContentHandle, DurationProbe, MediaElement, MediaEvent};
use boombox_core::picker::ContentPicker;
use boombox_core::session::{
    DisplayMetadata, MediaAction, MediaSession, PlaybackIndication, PositionState,
};
use boombox_core::source::{DeckMessage, Source};
use boombox_core::tags::{TagRequest, TagResponse};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::codecs;
use crate::playlist::DeckPlaylist;
use crate::types::{DeckConfig, PlaybackMode, TransportState};

const EVENT_CHANNEL_CAPACITY: usize = 64;

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
    /// a pause confirmation completes the pause toggle
    ConfirmPauseOn,
    /// a playing confirmation completes the resume toggle
    ConfirmPauseOff,
    /// a pause confirmation finalizes a stop
    FinishStop,
}

/// Local-file playback source
pub struct Deck {
    media: Box<dyn MediaElement>,
    playlist: DeckPlaylist,
    state: TransportState,
    pending: Pending,
    playback_mode: PlaybackMode,
    autoplay: bool,
    seek_skip: Duration,
    loaded_index: Option<usize>,
    node: NodeRef,
    graph: Arc<Mutex<dyn AudioGraph>>,
    session: Box<dyn MediaSession>,
    picker: Arc<dyn ContentPicker>,
    probe: Arc<dyn DurationProbe>,
    tag_requests: Option<mpsc::UnboundedSender<TagRequest>>,
    events: broadcast::Sender<SourceEvent>,
}

impl Deck {
    /// Create a deck over its media primitive and collaborators
    ///
    /// The supported file extensions are derived from the codec table
    /// probed against the media primitive.
    pub fn new(
        media: Box<dyn MediaElement>,
        node: NodeRef,
        graph: Arc<Mutex<dyn AudioGraph>>,
        session: Box<dyn MediaSession>,
        picker: Arc<dyn ContentPicker>,
        probe: Arc<dyn DurationProbe>,
        config: DeckConfig,
    ) -> Self {
        let extensions = codecs::supported_extensions(media.as_ref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            media,
            playlist: DeckPlaylist::new(extensions),
            state: TransportState::Stopped,
            pending: Pending::None,
            playback_mode: config.playback_mode,
            autoplay: config.autoplay,
            seek_skip: config.seek_skip,
            loaded_index: None,
            node,
            graph,
            session,
            picker,
            probe,
            tag_requests: None,
            events,
        }
    }

    /// Current transport state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// The deck's playlist
    pub fn playlist(&self) -> &DeckPlaylist {
        &self.playlist
    }

    /// Current end-of-track behavior
    pub fn playback_mode(&self) -> PlaybackMode {
        self.playback_mode
    }

    /// Change the end-of-track behavior
    pub fn set_playback_mode(&mut self, playback_mode: PlaybackMode) {
        self.playback_mode = playback_mode;
    }

    /// Start playback automatically when a playlist loads
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// Attach the background tag worker's request channel
    pub fn set_tag_worker(&mut self, requests: mpsc::UnboundedSender<TagRequest>) {
        self.tag_requests = Some(requests);
    }

    /// Open a new selection and load it into the playlist
    ///
    /// Emits [`SourceEvent::Open`] immediately; the outcome arrives as
    /// `Loaded`, `NotPicked`, `Cancel`, or `ClosedByFallback`. A loaded
    /// playlist is handed to the tag worker and its durations are probed
    /// entry by entry.
    pub async fn load(&mut self, dir_mode: bool) {
        self.emit(SourceEvent::Open);
        let picker = Arc::clone(&self.picker);
        let message = self.playlist.load(picker.as_ref(), dir_mode).await;
        let loaded = matches!(message, DeckMessage::Loaded);
        self.handle_playlist_message(message);
        if loaded {
            self.request_tags();
            self.probe_durations().await;
        }
    }

    /// Begin playback of the cursor entry
    ///
    /// Fails unless stopped. A cursor on an unplayable entry is advanced
    /// to the next playable one first.
    pub fn play(&mut self) -> bool {
        if self.state != TransportState::Stopped {
            return false;
        }
        if !self.playlist.is_entry_playable(self.playlist.cursor())
            && !self.playlist.cursor_to_next_playable()
        {
            return false;
        }
        let position = self.playlist.cursor();
        self.state = TransportState::Busy;
        self.pending = Pending::PlayOnLoaded {
            position,
            old_position: position,
        };
        self.load_track(position);
        true
    }

    /// Toggle between playing and paused
    pub fn pause(&mut self) -> bool {
        match self.state {
            TransportState::Playing => {
                self.state = TransportState::Busy;
                self.pending = Pending::ConfirmPauseOn;
                self.media.pause();
                true
            }
            TransportState::Paused => {
                self.state = TransportState::Busy;
                self.pending = Pending::ConfirmPauseOff;
                self.media.play();
                true
            }
            _ => false,
        }
    }

    /// Stop playback and reset the position to zero
    pub fn stop(&mut self) -> bool {
        if self.state == TransportState::Stopped {
            return false;
        }
        self.state = TransportState::Busy;
        self.pending = Pending::FinishStop;
        if self.media.is_paused() {
            // no real pause transition will fire
            self.handle_media_event(MediaEvent::Paused);
        } else {
            self.media.pause();
        }
        true
    }

    /// Jump to the previous playable entry
    pub fn previous(&mut self) -> bool {
        if self.state == TransportState::Paused || self.playlist.is_empty() {
            return false;
        }
        let old_position = self.playlist.cursor();
        if !self.playlist.cursor_to_previous_playable() {
            self.playlist.set_cursor(old_position);
        }
        self.jump_from(old_position);
        true
    }

    /// Jump to the next playable entry
    pub fn next(&mut self) -> bool {
        if self.state == TransportState::Paused || self.playlist.is_empty() {
            return false;
        }
        let old_position = self.playlist.cursor();
        if !self.playlist.cursor_to_next_playable() {
            self.playlist.set_cursor(old_position);
        }
        self.jump_from(old_position);
        true
    }

    /// Jump to the first playable entry after the next directory
    pub fn next_directory(&mut self) -> bool {
        if self.state == TransportState::Paused || self.playlist.is_empty() {
            return false;
        }
        let old_position = self.playlist.cursor();
        if !self.playlist.cursor_to_next_directory() {
            self.playlist.set_cursor(old_position);
        } else if !self.playlist.cursor_to_next_playable() {
            self.playlist.set_cursor(old_position);
        }
        self.jump_from(old_position);
        true
    }

    /// Jump to the first playable entry of the previous directory
    pub fn previous_directory(&mut self) -> bool {
        if self.state == TransportState::Paused || self.playlist.is_empty() {
            return false;
        }
        let old_position = self.playlist.cursor();
        if !self.playlist.cursor_to_previous_directory() {
            self.playlist.set_cursor(old_position);
        } else if !self.playlist.cursor_to_next_playable() {
            self.playlist.set_cursor(old_position);
        }
        self.jump_from(old_position);
        true
    }

    /// Jump to an arbitrary playable position
    pub fn play_from_position(&mut self, position: usize) -> bool {
        if !self.playlist.is_entry_playable(position) {
            return false;
        }
        let old_position = self.playlist.cursor();
        self.playlist.set_cursor(position);
        self.jump_from(old_position);
        true
    }

    /// Request recording of the current output
    pub fn record(&self) {
        self.emit(SourceEvent::Record);
    }

    /// Apply a background tag-worker response
    pub fn handle_tag_response(&mut self, response: TagResponse) {
        match response {
            TagResponse::Tags { index, tags } => {
                if let Some(message) = self.playlist.set_tags(index, tags) {
                    self.handle_playlist_message(message);
                }
            }
        }
    }

    /// Advance the state machine with a media-primitive confirmation
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Playing => match self.pending {
                Pending::ConfirmPlay {
                    position,
                    old_position,
                } => {
                    self.pending = Pending::None;
                    self.state = TransportState::Playing;
                    self.update_playback_state();
                    self.emit(SourceEvent::Play {
                        position,
                        old_position,
                    });
                }
                Pending::ConfirmPauseOff => {
                    self.pending = Pending::None;
                    self.state = TransportState::Playing;
                    self.emit(SourceEvent::PauseOff {
                        position: self.playlist.cursor(),
                    });
                }
                _ => {}
            },
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
                        self.load_track(position);
                    }
                    Pending::ConfirmPauseOn => {
                        self.pending = Pending::None;
                        self.state = TransportState::Paused;
                        self.emit(SourceEvent::PauseOn {
                            position: self.playlist.cursor(),
                        });
                    }
                    Pending::FinishStop => {
                        self.pending = Pending::None;
                        self.state = TransportState::Stopped;
                        self.media.seek(Duration::ZERO);
                        self.update_playback_state();
                        self.emit(SourceEvent::Stop {
                            position: self.playlist.cursor(),
                            ended: false,
                            playlist_ended: false,
                            manual: true,
                        });
                    }
                    _ => {}
                }
            }
            MediaEvent::Ended => self.handle_ended(),
            MediaEvent::LoadedData => {
                self.emit(SourceEvent::LoadedData {
                    position: self.playlist.cursor(),
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
            MediaEvent::TimeUpdate { position: time } => {
                self.update_position_state();
                self.emit(SourceEvent::TimeUpdate {
                    position: self.playlist.cursor(),
                    time,
                });
            }
            MediaEvent::LoadStart => {
                self.emit(SourceEvent::LoadStart {
                    position: self.playlist.cursor(),
                });
            }
            MediaEvent::Progress => {
                self.emit(SourceEvent::Progress {
                    position: self.playlist.cursor(),
                });
            }
            MediaEvent::Error { code } => {
                self.emit(SourceEvent::TrackError {
                    position: self.playlist.cursor(),
                    code,
                });
            }
            MediaEvent::Abort => {
                self.emit(SourceEvent::TrackAbort {
                    position: self.playlist.cursor(),
                });
            }
        }
    }

    fn handle_ended(&mut self) {
        self.state = TransportState::Stopped;
        self.update_playback_state();
        match self.playback_mode {
            PlaybackMode::RepeatTrack => {
                self.emit_ended_stop(false);
                self.play();
                return;
            }
            PlaybackMode::RepeatDir => {
                let previous_path = self
                    .playlist
                    .current()
                    .map(|e| e.path.clone())
                    .unwrap_or_default();
                let moved = self.playlist.cursor_to_next_playable();
                let stayed = moved
                    && self
                        .playlist
                        .current()
                        .map(|e| e.path == previous_path)
                        .unwrap_or(false);
                if stayed {
                    self.emit_ended_stop(false);
                    self.play();
                    return;
                }
                if self.playlist.cursor_to_first_track_of(&previous_path) {
                    self.emit_ended_stop(false);
                    self.play();
                    return;
                }
            }
            PlaybackMode::Default | PlaybackMode::RepeatAll => {}
        }
        if self.playlist.cursor_to_next_playable() {
            self.emit_ended_stop(false);
            self.play();
            return;
        }
        self.playlist.reset_position();
        if self.playback_mode == PlaybackMode::RepeatAll {
            self.play();
        }
        self.emit_ended_stop(true);
    }

    fn emit_ended_stop(&self, playlist_ended: bool) {
        self.emit(SourceEvent::Stop {
            position: self.playlist.cursor(),
            ended: true,
            playlist_ended,
            manual: false,
        });
    }

    fn handle_playlist_message(&mut self, message: DeckMessage) {
        match message {
            DeckMessage::Loaded => {
                if self.autoplay {
                    self.play();
                } else {
                    self.load_track(self.playlist.cursor());
                }
                self.emit(SourceEvent::Loaded);
            }
            DeckMessage::TrackChanged { index } => {
                // re-render only when the arrival concerns the live cursor
                if index == self.playlist.cursor() {
                    self.update_metadata();
                }
                self.emit(SourceEvent::TrackChanged { position: index });
            }
            DeckMessage::TrackTimeChanged { index, duration } => {
                self.emit(SourceEvent::TrackTimeChanged {
                    position: index,
                    duration,
                });
            }
            DeckMessage::NotPicked => self.emit(SourceEvent::NotPicked),
            DeckMessage::Cancel { reason } => self.emit(SourceEvent::Cancel { reason }),
            DeckMessage::ClosedByFallback => self.emit(SourceEvent::ClosedByFallback),
        }
    }

    fn jump_from(&mut self, old_position: usize) {
        let position = self.playlist.cursor();
        self.pending = Pending::LoadOnPause {
            position,
            old_position,
        };
        if self.media.is_paused() {
            self.handle_media_event(MediaEvent::Paused);
        } else {
            self.media.pause();
        }
    }

    /// Substitute the loaded content, skipping the reload when the entry
    /// is already loaded
    fn load_track(&mut self, index: usize) {
        if self.loaded_index == Some(index) {
            self.handle_media_event(MediaEvent::LoadedData);
            return;
        }
        match self.playlist.handle_of(index) {
            Some(handle) => {
                self.media.load(&handle);
                self.loaded_index = Some(index);
            }
            None => warn!("entry {} has no playable content", index),
        }
    }

    fn request_tags(&self) {
        if let Some(requests) = &self.tag_requests {
            let entries: Vec<Option<ContentHandle>> = self
                .playlist
                .entries()
                .iter()
                .map(|e| e.handle.clone())
                .collect();
            if requests.send(TagRequest::Playlist { entries }).is_err() {
                warn!("tag worker unavailable");
            }
        }
    }

    async fn probe_durations(&mut self) {
        let probe = Arc::clone(&self.probe);
        for index in 0..self.playlist.len() {
            if let Some(message) = self.playlist.probe_duration(index, probe.as_ref()).await {
                self.handle_playlist_message(message);
            }
        }
    }

    fn current_metadata(&self) -> DisplayMetadata {
        match self.playlist.current() {
            Some(entry) => {
                let tags = entry.tags.clone().unwrap_or_default();
                DisplayMetadata {
                    title: tags.title.unwrap_or_else(|| entry.name.clone()),
                    artist: tags.artist.unwrap_or_default(),
                    album: tags.album.unwrap_or_else(|| entry.path.join("/")),
                }
            }
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
            MediaAction::Play => {
                if self.state == TransportState::Paused {
                    self.pause();
                } else if self.state == TransportState::Stopped {
                    self.play();
                }
            }
            MediaAction::Pause => {
                self.pause();
            }
            MediaAction::Stop => {
                self.stop();
            }
            MediaAction::SeekBackward => {
                let target = self.media.position().saturating_sub(self.seek_skip);
                self.media.seek(target);
            }
            MediaAction::SeekForward => {
                let mut target = self.media.position() + self.seek_skip;
                if let Some(duration) = self.media.duration() {
                    target = target.min(duration);
                }
                self.media.seek(target);
            }
            MediaAction::PreviousTrack => {
                self.previous();
            }
            MediaAction::NextTrack => {
                self.next();
            }
            MediaAction::SeekTo { .. } => {
                debug!("seekto - unsupported action");
            }
        }
    }

    fn emit(&self, event: SourceEvent) {
        let _ = self.events.send(event);
    }
}

impl Source for Deck {
    fn plug_in(&mut self) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boombox_core::picker::{DirectoryHandle, PickError, PickedEntry, PickedFile};
    use boombox_core::session::NoopMediaSession;

    #[derive(Debug, Default)]
    struct MediaState {
        loaded: Option<ContentHandle>,
        paused: bool,
        position: Duration,
        duration: Option<Duration>,
        calls: Vec<String>,
    }

    #[derive(Clone)]
    struct ScriptedMedia(Arc<Mutex<MediaState>>);

    impl ScriptedMedia {
        fn new() -> (Self, Arc<Mutex<MediaState>>) {
            let state = Arc::new(Mutex::new(MediaState {
                paused: true,
                ..MediaState::default()
            }));
            (Self(Arc::clone(&state)), state)
        }
    }

    impl MediaElement for ScriptedMedia {
        fn load(&mut self, handle: &ContentHandle) {
            let mut state = self.0.lock().unwrap();
            state.loaded = Some(handle.clone());
            state.calls.push(format!("load {handle}"));
        }

        fn play(&mut self) {
            self.0.lock().unwrap().calls.push("play".to_string());
        }

        fn pause(&mut self) {
            self.0.lock().unwrap().calls.push("pause".to_string());
        }

        fn unload(&mut self) {
            let mut state = self.0.lock().unwrap();
            state.loaded = None;
            state.calls.push("unload".to_string());
        }

        fn seek(&mut self, position: Duration) {
            let mut state = self.0.lock().unwrap();
            state.position = position;
            state.calls.push(format!("seek {}", position.as_secs()));
        }

        fn position(&self) -> Duration {
            self.0.lock().unwrap().position
        }

        fn duration(&self) -> Option<Duration> {
            self.0.lock().unwrap().duration
        }

        fn is_paused(&self) -> bool {
            self.0.lock().unwrap().paused
        }

        fn can_play(&self, mime: &str) -> bool {
            mime == "audio/mp3"
        }
    }

    struct RecordingGraph {
        resumed: usize,
    }

    impl AudioGraph for RecordingGraph {
        fn connect(&mut self, _from: NodeRef, _to: NodeRef) {}
        fn disconnect(&mut self, _from: NodeRef, _to: NodeRef) {}
        fn destination(&self) -> NodeRef {
            NodeRef::new(0)
        }
        fn resume_if_suspended(&mut self) {
            self.resumed += 1;
        }
    }

    #[derive(Clone)]
    struct FakeDir {
        name: String,
        dirs: Vec<FakeDir>,
        files: Vec<String>,
    }

    #[async_trait]
    impl DirectoryHandle for FakeDir {
        fn name(&self) -> &str {
            &self.name
        }

        async fn entries(&self) -> Result<Vec<PickedEntry>, PickError> {
            let mut out: Vec<PickedEntry> = Vec::new();
            for f in &self.files {
                out.push(PickedEntry::File(PickedFile {
                    name: f.clone(),
                    handle: ContentHandle::new(format!("mem://{}/{}", self.name, f)),
                }));
            }
            for d in &self.dirs {
                out.push(PickedEntry::Directory(Box::new(d.clone())));
            }
            Ok(out)
        }
    }

    struct FakePicker {
        files: Vec<String>,
        dir: Option<FakeDir>,
    }

    #[async_trait]
    impl ContentPicker for FakePicker {
        async fn pick_files(&self) -> Result<Vec<PickedFile>, PickError> {
            if self.files.is_empty() {
                return Err(PickError::Cancelled);
            }
            Ok(self
                .files
                .iter()
                .map(|name| PickedFile {
                    name: name.clone(),
                    handle: ContentHandle::new(format!("mem://{name}")),
                })
                .collect())
        }

        async fn pick_directory(&self) -> Result<Box<dyn DirectoryHandle>, PickError> {
            match &self.dir {
                Some(dir) => Ok(Box::new(dir.clone())),
                None => Err(PickError::Cancelled),
            }
        }
    }

    struct FixedProbe(Duration);

    #[async_trait]
    impl DurationProbe for FixedProbe {
        async fn probe(&self, _handle: &ContentHandle) -> boombox_core::error::Result<Duration> {
            Ok(self.0)
        }
    }

    fn test_deck(picker: FakePicker) -> (Deck, Arc<Mutex<MediaState>>) {
        let (media, state) = ScriptedMedia::new();
        let deck = Deck::new(
            Box::new(media),
            NodeRef::new(1),
            Arc::new(Mutex::new(RecordingGraph { resumed: 0 })),
            Box::new(NoopMediaSession),
            Arc::new(picker),
            Arc::new(FixedProbe(Duration::from_secs(120))),
            DeckConfig::default(),
        );
        (deck, state)
    }

    fn flat_picker(files: &[&str]) -> FakePicker {
        FakePicker {
            files: files.iter().map(|s| (*s).to_string()).collect(),
            dir: None,
        }
    }

    fn two_album_picker() -> FakePicker {
        FakePicker {
            files: Vec::new(),
            dir: Some(FakeDir {
                name: "Music".to_string(),
                files: Vec::new(),
                dirs: vec![
                    FakeDir {
                        name: "Album1".to_string(),
                        dirs: Vec::new(),
                        files: vec!["t1.mp3".to_string(), "t2.mp3".to_string()],
                    },
                    FakeDir {
                        name: "Album2".to_string(),
                        dirs: Vec::new(),
                        files: vec!["t3.mp3".to_string()],
                    },
                ],
            }),
        }
    }

    fn confirm_playing(deck: &mut Deck, state: &Arc<Mutex<MediaState>>) {
        deck.handle_media_event(MediaEvent::LoadedData);
        state.lock().unwrap().paused = false;
        deck.handle_media_event(MediaEvent::Playing);
    }

    fn confirm_paused(deck: &mut Deck, state: &Arc<Mutex<MediaState>>) {
        state.lock().unwrap().paused = true;
        deck.handle_media_event(MediaEvent::Paused);
    }

    fn drain(rx: &mut broadcast::Receiver<SourceEvent>) -> Vec<SourceEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_play_walks_load_then_play() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        let mut rx = deck.subscribe();
        deck.load(false).await;
        assert_eq!(deck.state(), TransportState::Stopped);

        // load() pre-loaded the cursor entry
        assert_eq!(state.lock().unwrap().loaded.is_some(), true);
        assert!(deck.play());
        assert_eq!(deck.state(), TransportState::Busy);
        // re-entrant transport calls are rejected while busy
        assert!(!deck.play());
        assert!(!deck.pause());

        confirm_playing(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Playing);
        let events = drain(&mut rx);
        assert!(events.contains(&SourceEvent::Play {
            position: 0,
            old_position: 0,
        }));
    }

    #[tokio::test]
    async fn test_preloaded_entry_is_not_reloaded() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);

        let loads = state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with("load"))
            .count();
        assert_eq!(loads, 1);
    }

    #[tokio::test]
    async fn test_pause_toggles_through_busy() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        // pause and stop are rejected while stopped
        assert!(!deck.pause());
        assert!(!deck.stop());

        deck.play();
        confirm_playing(&mut deck, &state);

        let mut rx = deck.subscribe();
        assert!(deck.pause());
        assert_eq!(deck.state(), TransportState::Busy);
        confirm_paused(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Paused);
        assert!(drain(&mut rx).contains(&SourceEvent::PauseOn { position: 0 }));

        assert!(deck.pause());
        state.lock().unwrap().paused = false;
        deck.handle_media_event(MediaEvent::Playing);
        assert_eq!(deck.state(), TransportState::Playing);
        assert!(drain(&mut rx).contains(&SourceEvent::PauseOff { position: 0 }));
    }

    #[tokio::test]
    async fn test_stop_resets_position() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);
        state.lock().unwrap().position = Duration::from_secs(30);

        let mut rx = deck.subscribe();
        assert!(deck.stop());
        confirm_paused(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Stopped);
        assert_eq!(state.lock().unwrap().position, Duration::ZERO);
        assert!(drain(&mut rx).contains(&SourceEvent::Stop {
            position: 0,
            ended: false,
            playlist_ended: false,
            manual: true,
        }));
    }

    #[tokio::test]
    async fn test_next_orders_pause_load_play() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);
        state.lock().unwrap().calls.clear();

        let mut rx = deck.subscribe();
        assert!(deck.next());
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);

        let calls = state.lock().unwrap().calls.clone();
        assert_eq!(calls, vec!["pause", "load mem://b.mp3", "play"]);
        assert!(drain(&mut rx).contains(&SourceEvent::Play {
            position: 1,
            old_position: 0,
        }));
        assert_eq!(deck.playlist().cursor(), 1);
    }

    #[tokio::test]
    async fn test_next_at_end_restarts_current() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);

        assert!(deck.next());
        // traversal failed so the cursor was restored
        assert_eq!(deck.playlist().cursor(), 0);
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Playing);
    }

    #[tokio::test]
    async fn test_navigation_rejected_while_paused() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);
        deck.pause();
        confirm_paused(&mut deck, &state);

        assert!(!deck.next());
        assert!(!deck.previous());
        assert!(!deck.next_directory());
        assert!(!deck.previous_directory());
    }

    #[tokio::test]
    async fn test_repeat_track_keeps_cursor_across_ends() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        deck.load(false).await;
        deck.set_playback_mode(PlaybackMode::RepeatTrack);
        deck.play();
        confirm_playing(&mut deck, &state);

        for _ in 0..3 {
            state.lock().unwrap().paused = true;
            deck.handle_media_event(MediaEvent::Ended);
            confirm_playing(&mut deck, &state);
            assert_eq!(deck.playlist().cursor(), 0);
            assert_eq!(deck.state(), TransportState::Playing);
        }
    }

    #[tokio::test]
    async fn test_repeat_dir_restarts_directory_at_its_end() {
        let (mut deck, state) = test_deck(two_album_picker());
        deck.load(true).await;
        deck.set_playback_mode(PlaybackMode::RepeatDir);
        // entries: Music, Album1, t1, t2, Album2, t3; cursor lands on t1
        assert_eq!(deck.playlist().cursor(), 2);
        assert!(deck.play_from_position(3));
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);

        // t2 is the last track of Album1
        state.lock().unwrap().paused = true;
        deck.handle_media_event(MediaEvent::Ended);
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.playlist().cursor(), 2);
        assert_eq!(
            deck.playlist().current().map(|e| e.name.clone()),
            Some("t1.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn test_repeat_dir_advances_within_directory() {
        let (mut deck, state) = test_deck(two_album_picker());
        deck.load(true).await;
        deck.set_playback_mode(PlaybackMode::RepeatDir);
        deck.play();
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.playlist().cursor(), 2);

        state.lock().unwrap().paused = true;
        deck.handle_media_event(MediaEvent::Ended);
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.playlist().cursor(), 3);
    }

    #[tokio::test]
    async fn test_default_mode_stops_with_playlist_ended() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        deck.load(false).await;
        deck.play_from_position(1);
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);

        let mut rx = deck.subscribe();
        state.lock().unwrap().paused = true;
        deck.handle_media_event(MediaEvent::Ended);
        assert_eq!(deck.state(), TransportState::Stopped);
        assert_eq!(deck.playlist().cursor(), 0);
        assert!(drain(&mut rx).contains(&SourceEvent::Stop {
            position: 0,
            ended: true,
            playlist_ended: true,
            manual: false,
        }));
    }

    #[tokio::test]
    async fn test_repeat_all_restarts_from_top() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        deck.load(false).await;
        deck.set_playback_mode(PlaybackMode::RepeatAll);
        deck.play_from_position(1);
        confirm_paused(&mut deck, &state);
        confirm_playing(&mut deck, &state);

        state.lock().unwrap().paused = true;
        deck.handle_media_event(MediaEvent::Ended);
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.playlist().cursor(), 0);
        assert_eq!(deck.state(), TransportState::Playing);
    }

    #[tokio::test]
    async fn test_autoplay_starts_playback_on_load() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.set_autoplay(true);
        deck.load(false).await;
        assert_eq!(deck.state(), TransportState::Busy);
        confirm_playing(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Playing);
    }

    #[tokio::test]
    async fn test_duration_probe_reports_per_entry() {
        let (mut deck, _state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        let mut rx = deck.subscribe();
        deck.load(false).await;

        let events = drain(&mut rx);
        let times: Vec<&SourceEvent> = events
            .iter()
            .filter(|e| matches!(e, SourceEvent::TrackTimeChanged { .. }))
            .collect();
        assert_eq!(times.len(), 2);
        assert_eq!(
            deck.playlist().entry(0).and_then(|e| e.duration),
            Some(Duration::from_secs(120))
        );
    }

    #[tokio::test]
    async fn test_stale_tag_arrival_updates_entry_without_metadata_render() {
        let (mut deck, _state) = test_deck(flat_picker(&["a.mp3", "b.mp3"]));
        let mut rx = deck.subscribe();
        deck.load(false).await;
        drain(&mut rx);

        // cursor is at 0; tags for entry 1 still update the entry and
        // emit a track change
        deck.handle_tag_response(TagResponse::Tags {
            index: 1,
            tags: boombox_core::tags::TrackTags {
                title: Some("Late".to_string()),
                artist: None,
                album: None,
            },
        });
        assert!(drain(&mut rx).contains(&SourceEvent::TrackChanged { position: 1 }));
        assert_eq!(
            deck.playlist()
                .entry(1)
                .and_then(|e| e.tags.as_ref().and_then(|t| t.title.clone())),
            Some("Late".to_string())
        );
    }

    #[tokio::test]
    async fn test_media_action_play_resumes_or_starts() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        deck.media_action(MediaAction::Play);
        assert_eq!(deck.state(), TransportState::Busy);
        confirm_playing(&mut deck, &state);

        deck.media_action(MediaAction::Pause);
        confirm_paused(&mut deck, &state);
        assert_eq!(deck.state(), TransportState::Paused);

        deck.media_action(MediaAction::Play);
        state.lock().unwrap().paused = false;
        deck.handle_media_event(MediaEvent::Playing);
        assert_eq!(deck.state(), TransportState::Playing);
    }

    #[tokio::test]
    async fn test_seek_actions_clamp() {
        let (mut deck, state) = test_deck(flat_picker(&["a.mp3"]));
        deck.load(false).await;
        deck.play();
        confirm_playing(&mut deck, &state);
        {
            let mut media = state.lock().unwrap();
            media.position = Duration::from_secs(2);
            media.duration = Some(Duration::from_secs(100));
        }

        deck.media_action(MediaAction::SeekBackward);
        assert_eq!(state.lock().unwrap().position, Duration::ZERO);

        state.lock().unwrap().position = Duration::from_secs(98);
        deck.media_action(MediaAction::SeekForward);
        assert_eq!(state.lock().unwrap().position, Duration::from_secs(100));
    }
}
