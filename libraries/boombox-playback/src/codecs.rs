//! Codec Capability Table
//!
//! The fixed set of audio codecs the deck knows about. Each codec is
//! probed against the media primitive's format support; only extensions
//! whose codec is reported playable are accepted into a playlist.

use boombox_core::media::MediaElement;

/// One codec with its MIME type and file extensions
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    pub name: &'static str,
    pub mime: &'static str,
    pub extensions: &'static [&'static str],
}

/// The codecs the deck probes for
pub const CODECS: &[Codec] = &[
    Codec {
        name: "3GP",
        mime: "audio/3gpp",
        extensions: &["3gp", "3g2"],
    },
    Codec {
        name: "ADTS",
        mime: "audio/aac",
        extensions: &["aac"],
    },
    Codec {
        name: "FLAC",
        mime: "audio/flac",
        extensions: &["flac"],
    },
    Codec {
        name: "MPEG",
        mime: "audio/mpeg",
        extensions: &["mpg", "mpeg"],
    },
    Codec {
        name: "MP3",
        mime: "audio/mp3",
        extensions: &["mp3"],
    },
    Codec {
        name: "MP4",
        mime: "audio/mp4",
        extensions: &["mp4", "m4a"],
    },
    Codec {
        name: "OGG",
        mime: "audio/ogg",
        extensions: &["oga", "ogg"],
    },
    Codec {
        name: "WAV",
        mime: "audio/wav",
        extensions: &["wav"],
    },
    Codec {
        name: "WebM",
        mime: "audio/webm",
        extensions: &["webm"],
    },
];

/// Extensions whose codec the media primitive reports as playable
pub fn supported_extensions(media: &dyn MediaElement) -> Vec<String> {
    CODECS
        .iter()
        .filter(|codec| media.can_play(codec.mime))
        .flat_map(|codec| codec.extensions.iter().map(|ext| (*ext).to_string()))
        .collect()
}

/// Codecs the media primitive reports as playable
pub fn supported_codecs(media: &dyn MediaElement) -> Vec<Codec> {
    CODECS
        .iter()
        .filter(|codec| media.can_play(codec.mime))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boombox_core::media::ContentHandle;
    use std::time::Duration;

    struct Mp3OnlyElement;

    impl MediaElement for Mp3OnlyElement {
        fn load(&mut self, _handle: &ContentHandle) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn unload(&mut self) {}
        fn seek(&mut self, _position: Duration) {}
        fn position(&self) -> Duration {
            Duration::ZERO
        }
        fn duration(&self) -> Option<Duration> {
            None
        }
        fn is_paused(&self) -> bool {
            true
        }
        fn can_play(&self, mime: &str) -> bool {
            mime == "audio/mp3" || mime == "audio/mpeg"
        }
    }

    #[test]
    fn test_supported_extensions_follow_probe() {
        let extensions = supported_extensions(&Mp3OnlyElement);
        assert_eq!(extensions, vec!["mpg", "mpeg", "mp3"]);
    }

    #[test]
    fn test_supported_codecs_follow_probe() {
        let codecs = supported_codecs(&Mp3OnlyElement);
        let names: Vec<&str> = codecs.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["MPEG", "MP3"]);
    }
}
