//! Deck Playlist / Cursor Engine
//!
//! Holds the flat pre-order entry sequence and the integer cursor, and
//! implements the traversal algorithms transport commands move the cursor
//! with. All traversals operate purely on the cursor and report whether it
//! landed on an existing entry; the caller decides whether to revert on
//! failure.
//!
//! Loading delegates to a [`ContentPicker`] collaborator. A selection
//! collaborator that cannot present a dialog at all reports
//! [`DeckMessage::ClosedByFallback`]; a dismissed dialog becomes
//! [`DeckMessage::NotPicked`] when a previous selection survives and
//! [`DeckMessage::Cancel`] otherwise.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use boombox_core::media::{ContentHandle, DurationProbe};
use boombox_core::picker::{ContentPicker, DirectoryHandle, PickError, PickedEntry};
use boombox_core::source::DeckMessage;
use boombox_core::tags::TrackTags;
use tracing::debug;

use crate::error::{PlaybackError, Result};
use crate::types::{EntryKind, PlaylistEntry};

/// The deck's ordered, hierarchical playlist
#[derive(Debug, Default)]
pub struct DeckPlaylist {
    entries: Vec<PlaylistEntry>,
    cursor: usize,
    extensions: Vec<String>,
}

impl DeckPlaylist {
    /// Create an empty playlist accepting the given file extensions
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            extensions,
        }
    }

    /// Discard all entries and reset the cursor
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Reset the cursor to the start without touching entries
    pub fn reset_position(&mut self) {
        self.cursor = 0;
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to an arbitrary position
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position;
    }

    /// The entry under the cursor, if one exists there
    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.entries.get(self.cursor)
    }

    /// The entry at `index`
    pub fn entry(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// All entries in pre-order
    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the playlist holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The playable content handle of the entry at `index`
    pub fn handle_of(&self, index: usize) -> Option<ContentHandle> {
        self.entries.get(index).and_then(|e| e.handle.clone())
    }

    /// Whether an entry exists at `index`
    pub fn entry_exists(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    /// Whether the entry at `index` exists, is a file, and is not errored
    pub fn is_entry_playable(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .map(|e| e.kind != EntryKind::Directory && !e.error)
            .unwrap_or(false)
    }

    /// Whether the entry at `index` exists and is a directory
    pub fn is_directory(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .map(|e| e.kind == EntryKind::Directory)
            .unwrap_or(false)
    }

    /// Step the cursor forward to the next playable entry
    ///
    /// Returns whether the cursor landed on an existing entry.
    pub fn cursor_to_next_playable(&mut self) -> bool {
        loop {
            self.cursor += 1;
            if !self.entry_exists(self.cursor) || self.is_entry_playable(self.cursor) {
                break;
            }
        }
        self.entry_exists(self.cursor)
    }

    /// Step the cursor backward to the previous playable entry
    ///
    /// On failure the cursor is left out of position; the caller restores
    /// it.
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

    /// Step the cursor forward to the next directory entry
    pub fn cursor_to_next_directory(&mut self) -> bool {
        loop {
            self.cursor += 1;
            if !self.entry_exists(self.cursor) || self.is_directory(self.cursor) {
                break;
            }
        }
        self.entry_exists(self.cursor)
    }

    /// Step the cursor backward to the previous directory entry
    ///
    /// The first directory met is the current track's own containing
    /// directory and is bypassed; later directories are accepted only
    /// when the entry immediately after them is playable. A cursor
    /// starting exactly on a directory entry bypasses the first
    /// directory met below it the same way.
    pub fn cursor_to_previous_directory(&mut self) -> bool {
        let mut first_passed_by = false;
        let mut pos = self.cursor as isize;
        loop {
            pos -= 1;
            if pos < 0 {
                break;
            }
            let index = pos as usize;
            if self.is_directory(index) {
                if !first_passed_by {
                    first_passed_by = true;
                    continue;
                }
                // accept only a directory that actually contains tracks
                if self.is_entry_playable(index + 1) {
                    break;
                }
            }
        }
        self.cursor = pos.max(0) as usize;
        pos >= 0
    }

    /// Move the cursor to the start of `directory`'s run of entries
    ///
    /// Steps backward past every entry that is unplayable or belongs to
    /// `directory`. The landing entry may be the directory entry itself;
    /// the play that follows advances to the next playable entry. Used to
    /// restart a directory under repeat-directory mode.
    pub fn cursor_to_first_track_of(&mut self, directory: &[String]) -> bool {
        loop {
            if self.cursor == 0 {
                break;
            }
            let prev = self.cursor - 1;
            if self.is_entry_playable(prev) && self.entries[prev].path != directory {
                break;
            }
            self.cursor = prev;
        }
        self.entry_exists(self.cursor)
    }

    /// Load a new selection through the picker collaborator
    pub async fn load(&mut self, picker: &dyn ContentPicker, dir_mode: bool) -> DeckMessage {
        match self.populate(picker, dir_mode).await {
            Ok(()) => DeckMessage::Loaded,
            Err(PlaybackError::Selection(PickError::Unavailable(reason))) => {
                debug!("selection collaborator unavailable: {}", reason);
                DeckMessage::ClosedByFallback
            }
            Err(err) => {
                if self.entries.is_empty() {
                    DeckMessage::Cancel {
                        reason: err.to_string(),
                    }
                } else {
                    DeckMessage::NotPicked
                }
            }
        }
    }

    /// Probe the duration of the entry at `index`
    ///
    /// Returns `None` for directories and out-of-range indices. A failed
    /// probe flags the entry and reports a zero duration.
    pub async fn probe_duration(
        &mut self,
        index: usize,
        probe: &dyn DurationProbe,
    ) -> Option<DeckMessage> {
        let handle = {
            let entry = self.entries.get(index)?;
            if entry.kind == EntryKind::Directory {
                return None;
            }
            entry.handle.clone()?
        };
        match probe.probe(&handle).await {
            Ok(duration) => {
                self.entries[index].duration = Some(duration);
                Some(DeckMessage::TrackTimeChanged { index, duration })
            }
            Err(_) => {
                self.entries[index].error = true;
                Some(DeckMessage::TrackTimeChanged {
                    index,
                    duration: Duration::ZERO,
                })
            }
        }
    }

    /// Apply background-extracted tags to the entry at `index`
    ///
    /// Always updates the entry, even when the cursor has since moved;
    /// the deck decides whether the arrival re-renders the current item.
    pub fn set_tags(&mut self, index: usize, tags: TrackTags) -> Option<DeckMessage> {
        let entry = self.entries.get_mut(index)?;
        entry.tags = Some(tags);
        Some(DeckMessage::TrackChanged { index })
    }

    async fn populate(&mut self, picker: &dyn ContentPicker, dir_mode: bool) -> Result<()> {
        if dir_mode {
            let dir = picker.pick_directory().await?;
            self.reset();
            let root_path = vec![dir.name().to_string()];
            self.entries.push(PlaylistEntry::directory(
                dir.name().to_string(),
                0,
                root_path.clone(),
            ));
            self.read_directory(dir.as_ref(), 1, &root_path).await?;
        } else {
            let files = picker.pick_files().await?;
            self.reset();
            for file in files {
                if self.has_supported_extension(&file.name) {
                    self.entries
                        .push(PlaylistEntry::file(file.name, file.handle, 0, Vec::new()));
                }
            }
            self.entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if !self.is_entry_playable(self.cursor) && !self.cursor_to_next_playable() {
            return Err(PlaybackError::NoPlayableFiles);
        }
        Ok(())
    }

    /// Depth-first pre-order walk: directories before files at each
    /// level, each group sorted by name. A directory left empty after
    /// extension filtering is pruned from the sequence.
    fn read_directory<'a>(
        &'a mut self,
        dir: &'a dyn DirectoryHandle,
        level: usize,
        path: &'a [String],
    ) -> Pin<Box<dyn Future<Output = std::result::Result<(), PickError>> + Send + 'a>> {
        Box::pin(async move {
            let mut children = dir.entries().await?;
            children.retain(|child| match child {
                PickedEntry::Directory(_) => true,
                PickedEntry::File(file) => self.has_supported_extension(&file.name),
            });
            children.sort_by(|a, b| {
                let rank = |e: &PickedEntry| match e {
                    PickedEntry::Directory(_) => 0,
                    PickedEntry::File(_) => 1,
                };
                let name = |e: &PickedEntry| match e {
                    PickedEntry::Directory(d) => d.name().to_string(),
                    PickedEntry::File(f) => f.name.clone(),
                };
                rank(a).cmp(&rank(b)).then_with(|| name(a).cmp(&name(b)))
            });
            for child in children {
                match child {
                    PickedEntry::Directory(sub) => {
                        let mut sub_path = path.to_vec();
                        sub_path.push(sub.name().to_string());
                        self.entries.push(PlaylistEntry::directory(
                            sub.name().to_string(),
                            level,
                            sub_path.clone(),
                        ));
                        let size = self.entries.len();
                        self.read_directory(sub.as_ref(), level + 1, &sub_path)
                            .await?;
                        if self.entries.len() == size {
                            // the directory turned out empty so remove it
                            self.entries.pop();
                        }
                    }
                    PickedEntry::File(file) => {
                        self.entries.push(PlaylistEntry::file(
                            file.name,
                            file.handle,
                            level,
                            path.to_vec(),
                        ));
                    }
                }
            }
            Ok(())
        })
    }

    fn has_supported_extension(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boombox_core::error::CoreError;
    use boombox_core::picker::PickedFile;
    use mockall::mock;
    use proptest::prelude::*;

    fn file(name: &str, path: &[&str]) -> PlaylistEntry {
        PlaylistEntry::file(
            name,
            ContentHandle::new(format!("mem://{name}")),
            path.len(),
            path.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    fn dir(name: &str, path: &[&str]) -> PlaylistEntry {
        PlaylistEntry::directory(
            name,
            path.len().saturating_sub(1),
            path.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    fn playlist(entries: Vec<PlaylistEntry>) -> DeckPlaylist {
        DeckPlaylist {
            entries,
            cursor: 0,
            extensions: vec!["mp3".to_string(), "ogg".to_string()],
        }
    }

    /// Two albums under one root, the layout most traversal rules care
    /// about:
    ///
    /// 0 Dir  Album1
    /// 1 File t1 (Album1)
    /// 2 File t2 (Album1)
    /// 3 Dir  Album2
    /// 4 File t3 (Album2)
    fn two_albums() -> DeckPlaylist {
        playlist(vec![
            dir("Album1", &["Album1"]),
            file("t1.mp3", &["Album1"]),
            file("t2.mp3", &["Album1"]),
            dir("Album2", &["Album2"]),
            file("t3.mp3", &["Album2"]),
        ])
    }

    #[test]
    fn test_next_playable_skips_directories() {
        let mut playlist = two_albums();
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 1);
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 2);
        // skips over the Album2 directory entry
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 4);
        assert!(!playlist.cursor_to_next_playable());
        assert!(!playlist.entry_exists(playlist.cursor()));
    }

    #[test]
    fn test_next_playable_skips_errored_entries() {
        let mut entries = vec![
            file("a.mp3", &[]),
            file("b.mp3", &[]),
            file("c.mp3", &[]),
        ];
        entries[1].error = true;
        let mut playlist = playlist(entries);
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 2);
    }

    #[test]
    fn test_next_playable_fails_on_directory_only_playlist() {
        let mut playlist = playlist(vec![dir("A", &["A"]), dir("B", &["B"])]);
        assert!(!playlist.cursor_to_next_playable());
        assert!(playlist.cursor() >= playlist.len());
    }

    #[test]
    fn test_previous_playable() {
        let mut playlist = two_albums();
        playlist.set_cursor(4);
        assert!(playlist.cursor_to_previous_playable());
        assert_eq!(playlist.cursor(), 2);
        assert!(playlist.cursor_to_previous_playable());
        assert_eq!(playlist.cursor(), 1);
        assert!(!playlist.cursor_to_previous_playable());
    }

    #[test]
    fn test_next_directory() {
        let mut playlist = two_albums();
        playlist.set_cursor(1);
        assert!(playlist.cursor_to_next_directory());
        assert_eq!(playlist.cursor(), 3);
        assert!(!playlist.cursor_to_next_directory());
    }

    #[test]
    fn test_previous_directory_lands_on_first_track_of_previous_album() {
        let mut playlist = two_albums();
        playlist.set_cursor(4);
        assert!(playlist.cursor_to_previous_directory());
        assert_eq!(playlist.cursor(), 0);
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 1);
    }

    #[test]
    fn test_previous_directory_bypasses_own_directory() {
        // from inside Album1 there is no earlier directory to land on
        let mut playlist = two_albums();
        playlist.set_cursor(2);
        assert!(!playlist.cursor_to_previous_directory());
    }

    #[test]
    fn test_previous_directory_starting_on_directory_entry() {
        // a cursor on Album2's directory entry treats Album1 as the
        // first directory met and bypasses it
        let mut playlist = two_albums();
        playlist.set_cursor(3);
        assert!(!playlist.cursor_to_previous_directory());
    }

    #[test]
    fn test_previous_directory_skips_directory_without_tracks() {
        // 0 Dir A / 1 File a / 2 Dir Broken / 3 File broken(error) /
        // 4 Dir B / 5 File b
        let mut entries = vec![
            dir("A", &["A"]),
            file("a.mp3", &["A"]),
            dir("Broken", &["Broken"]),
            file("x.mp3", &["Broken"]),
            dir("B", &["B"]),
            file("b.mp3", &["B"]),
        ];
        entries[3].error = true;
        let mut playlist = playlist(entries);
        playlist.set_cursor(5);
        // bypasses Dir B (own directory), rejects Dir Broken (entry
        // after it is errored), accepts Dir A
        assert!(playlist.cursor_to_previous_directory());
        assert_eq!(playlist.cursor(), 0);
    }

    #[test]
    fn test_first_track_of_directory_lands_on_its_entry() {
        let mut playlist = two_albums();
        playlist.set_cursor(2);
        assert!(playlist.cursor_to_first_track_of(&["Album1".to_string()]));
        assert_eq!(playlist.cursor(), 0);
        // the play that follows advances onto the first track
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 1);
    }

    #[test]
    fn test_first_track_of_directory_from_past_its_end() {
        let mut playlist = two_albums();
        playlist.set_cursor(4);
        assert!(playlist.cursor_to_first_track_of(&["Album2".to_string()]));
        assert_eq!(playlist.cursor(), 3);
        assert!(playlist.cursor_to_next_playable());
        assert_eq!(playlist.cursor(), 4);
    }

    #[test]
    fn test_first_track_of_leading_directory_lands_at_start() {
        let mut playlist = playlist(vec![
            file("a.mp3", &["A"]),
            file("b.mp3", &["A"]),
        ]);
        playlist.set_cursor(1);
        assert!(playlist.cursor_to_first_track_of(&["A".to_string()]));
        assert_eq!(playlist.cursor(), 0);
    }

    #[test]
    fn test_set_tags_reports_track_changed_for_any_index() {
        let mut playlist = two_albums();
        let tags = TrackTags {
            title: Some("Song".to_string()),
            artist: Some("Artist".to_string()),
            album: None,
        };
        let msg = playlist.set_tags(4, tags.clone());
        assert_eq!(msg, Some(DeckMessage::TrackChanged { index: 4 }));
        assert_eq!(playlist.entry(4).and_then(|e| e.tags.clone()), Some(tags));
        assert!(playlist.set_tags(99, TrackTags::default()).is_none());
    }

    proptest! {
        #[test]
        fn next_playable_never_lands_on_directory_or_error(
            kinds in proptest::collection::vec((0u8..3, any::<bool>()), 0..24),
            start in 0usize..24,
        ) {
            let entries: Vec<PlaylistEntry> = kinds
                .iter()
                .enumerate()
                .map(|(i, (kind, error))| {
                    if *kind == 0 {
                        dir(&format!("d{i}"), &[])
                    } else {
                        let mut entry = file(&format!("f{i}.mp3"), &[]);
                        entry.error = *error;
                        entry
                    }
                })
                .collect();
            let mut playlist = playlist(entries);
            playlist.set_cursor(start);
            let found = playlist.cursor_to_next_playable();
            if found {
                prop_assert!(playlist.is_entry_playable(playlist.cursor()));
                prop_assert!(playlist.cursor() > start);
            } else {
                prop_assert!(playlist.cursor() >= playlist.len());
            }
        }
    }

    mock! {
        Probe {}

        #[async_trait]
        impl DurationProbe for Probe {
            async fn probe(
                &self,
                handle: &ContentHandle,
            ) -> boombox_core::error::Result<Duration>;
        }
    }

    #[tokio::test]
    async fn test_probe_duration_annotates_entry() {
        let mut playlist = two_albums();
        let mut probe = MockProbe::new();
        probe
            .expect_probe()
            .returning(|_| Ok(Duration::from_secs(180)));

        let msg = playlist.probe_duration(1, &probe).await;
        assert_eq!(
            msg,
            Some(DeckMessage::TrackTimeChanged {
                index: 1,
                duration: Duration::from_secs(180),
            })
        );
        assert_eq!(
            playlist.entry(1).and_then(|e| e.duration),
            Some(Duration::from_secs(180))
        );
        // directories are not probed
        assert!(playlist.probe_duration(0, &probe).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_probe_flags_entry_and_reports_zero() {
        let mut playlist = two_albums();
        let mut probe = MockProbe::new();
        probe
            .expect_probe()
            .returning(|_| Err(CoreError::media("no metadata")));

        let msg = playlist.probe_duration(2, &probe).await;
        assert_eq!(
            msg,
            Some(DeckMessage::TrackTimeChanged {
                index: 2,
                duration: Duration::ZERO,
            })
        );
        assert!(!playlist.is_entry_playable(2));
    }

    #[derive(Clone)]
    struct FakeDir {
        name: String,
        dirs: Vec<FakeDir>,
        files: Vec<String>,
    }

    impl FakeDir {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                dirs: Vec::new(),
                files: Vec::new(),
            }
        }

        fn with_files(mut self, files: &[&str]) -> Self {
            self.files = files.iter().map(|s| (*s).to_string()).collect();
            self
        }

        fn with_dir(mut self, dir: FakeDir) -> Self {
            self.dirs.push(dir);
            self
        }
    }

    #[async_trait]
    impl DirectoryHandle for FakeDir {
        fn name(&self) -> &str {
            &self.name
        }

        async fn entries(&self) -> std::result::Result<Vec<PickedEntry>, PickError> {
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
        files: Vec<PickedFile>,
        dir: Option<FakeDir>,
        cancel: bool,
    }

    #[async_trait]
    impl ContentPicker for FakePicker {
        async fn pick_files(&self) -> std::result::Result<Vec<PickedFile>, PickError> {
            if self.cancel {
                return Err(PickError::Cancelled);
            }
            Ok(self.files.clone())
        }

        async fn pick_directory(
            &self,
        ) -> std::result::Result<Box<dyn DirectoryHandle>, PickError> {
            if self.cancel {
                return Err(PickError::Cancelled);
            }
            match &self.dir {
                Some(dir) => Ok(Box::new(dir.clone())),
                None => Err(PickError::Cancelled),
            }
        }
    }

    fn picked(name: &str) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            handle: ContentHandle::new(format!("mem://{name}")),
        }
    }

    #[tokio::test]
    async fn test_file_load_filters_and_sorts() {
        let picker = FakePicker {
            files: vec![picked("b.mp3"), picked("notes.txt"), picked("a.ogg")],
            dir: None,
            cancel: false,
        };
        let mut playlist = DeckPlaylist::new(vec!["mp3".to_string(), "ogg".to_string()]);
        let msg = playlist.load(&picker, false).await;
        assert_eq!(msg, DeckMessage::Loaded);
        let names: Vec<&str> = playlist.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.ogg", "b.mp3"]);
        assert_eq!(playlist.cursor(), 0);
    }

    #[tokio::test]
    async fn test_directory_load_walks_preorder_and_prunes_empty() {
        let root = FakeDir::new("Music")
            .with_files(&["root.mp3"])
            .with_dir(FakeDir::new("B").with_files(&["b1.mp3", "skip.txt"]))
            .with_dir(FakeDir::new("Empty").with_files(&["cover.jpg"]))
            .with_dir(FakeDir::new("A").with_files(&["a2.mp3", "a1.mp3"]));
        let picker = FakePicker {
            files: Vec::new(),
            dir: Some(root),
            cancel: false,
        };
        let mut playlist = DeckPlaylist::new(vec!["mp3".to_string()]);
        let msg = playlist.load(&picker, true).await;
        assert_eq!(msg, DeckMessage::Loaded);

        let names: Vec<&str> = playlist.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Music", "A", "a1.mp3", "a2.mp3", "B", "b1.mp3", "root.mp3"]
        );
        // cursor advanced past the leading directory entries
        assert_eq!(playlist.cursor(), 2);
        // a directory entry's path includes its own name
        assert_eq!(
            playlist.entry(1).map(|e| e.path.clone()),
            Some(vec!["Music".to_string(), "A".to_string()])
        );
        assert_eq!(
            playlist.entry(2).map(|e| e.path.clone()),
            Some(vec!["Music".to_string(), "A".to_string()])
        );
        assert_eq!(
            playlist.entry(6).map(|e| e.path.clone()),
            Some(vec!["Music".to_string()])
        );
    }

    #[tokio::test]
    async fn test_cancel_without_previous_selection() {
        let picker = FakePicker {
            files: Vec::new(),
            dir: None,
            cancel: true,
        };
        let mut playlist = DeckPlaylist::new(vec!["mp3".to_string()]);
        let msg = playlist.load(&picker, false).await;
        assert!(matches!(msg, DeckMessage::Cancel { .. }));
    }

    #[tokio::test]
    async fn test_cancel_with_previous_selection_reports_not_picked() {
        let loaded = FakePicker {
            files: vec![picked("a.mp3")],
            dir: None,
            cancel: false,
        };
        let mut playlist = DeckPlaylist::new(vec!["mp3".to_string()]);
        assert_eq!(playlist.load(&loaded, false).await, DeckMessage::Loaded);

        let cancelled = FakePicker {
            files: Vec::new(),
            dir: None,
            cancel: true,
        };
        let msg = playlist.load(&cancelled, false).await;
        assert_eq!(msg, DeckMessage::NotPicked);
        // the previous selection survives
        assert_eq!(playlist.len(), 1);
    }

    #[tokio::test]
    async fn test_selection_without_playable_files() {
        let picker = FakePicker {
            files: vec![picked("notes.txt")],
            dir: None,
            cancel: false,
        };
        let mut playlist = DeckPlaylist::new(vec!["mp3".to_string()]);
        let msg = playlist.load(&picker, false).await;
        // the emptied selection replaced the previous one, so this is a
        // cancel outcome
        assert!(matches!(msg, DeckMessage::Cancel { .. }));
    }
}
