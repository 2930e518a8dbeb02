//! Synthetic media containers.
//!
//! These builders only produce byte layouts that *look* like the named
//! formats (magic numbers and box/marker names at the right offsets). Only the
//! WAV builder yields a file a player will actually decode.

pub mod jpeg;
pub mod mp4;
pub mod wav;

pub use jpeg::build_jpeg;
pub use mp4::{Mp4Params, build_mp4};
pub use wav::{DEFAULT_SAMPLE_RATE, build_wav};

use crate::parser::filename::parse_media_name;

use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthKind {
    Mp4,
    Jpeg,
    Wav,
}

impl SynthKind {
    /// Returns the builder able to produce files with this extension, if any.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Jpeg => "jpg",
            Self::Wav => "wav",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Mp4 => "video",
            Self::Jpeg => "image",
            Self::Wav => "audio",
        }
    }
}

impl FromStr for SynthKind {
    type Err = String;

    /// Accepts an extension (`mp4`) or a media label (`video`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match s.as_str() {
            "video" => Ok(Self::Mp4),
            "image" => Ok(Self::Jpeg),
            "audio" => Ok(Self::Wav),
            other => Self::from_extension(other).ok_or_else(|| format!("Unknown media kind: {other}")),
        }
    }
}

/// Optional shape overrides for [`synthesize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthHints {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_secs: Option<u32>,
    pub creation_time: u32,
}

impl SynthHints {
    /// Picks up a resolution tag such as `720p` or `1080p` from a filename.
    #[must_use]
    pub fn from_filename(filename: &str, creation_time: u32) -> Self {
        let height = parse_media_name(filename).and_then(|name| name.height);

        Self {
            width: height.map(|h| h * 16 / 9),
            height,
            duration_secs: None,
            creation_time,
        }
    }
}

pub const DEFAULT_VIDEO_WIDTH: u32 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 720;
pub const DEFAULT_VIDEO_SECONDS: u32 = 10;
pub const DEFAULT_VIDEO_PAYLOAD: usize = 64 * 1024;
pub const DEFAULT_IMAGE_WIDTH: u16 = 640;
pub const DEFAULT_IMAGE_HEIGHT: u16 = 480;
pub const DEFAULT_AUDIO_SECONDS: f64 = 3.0;
pub const DEFAULT_AUDIO_FREQUENCY: f64 = 440.0;

/// Builds a sample file of the given kind using defaults overridden by `hints`.
#[must_use]
pub fn synthesize(kind: SynthKind, hints: &SynthHints) -> Vec<u8> {
    match kind {
        SynthKind::Mp4 => build_mp4(&Mp4Params {
            duration_secs: hints.duration_secs.unwrap_or(DEFAULT_VIDEO_SECONDS),
            width: hints.width.unwrap_or(DEFAULT_VIDEO_WIDTH),
            height: hints.height.unwrap_or(DEFAULT_VIDEO_HEIGHT),
            payload_size: DEFAULT_VIDEO_PAYLOAD,
            creation_time: hints.creation_time,
        }),
        SynthKind::Jpeg => {
            // Raw RGB payload grows with area; keep thumbnails small.
            let width = hints
                .width
                .map_or(DEFAULT_IMAGE_WIDTH, |w| u16::try_from(w.min(640)).unwrap_or(640));
            let height = hints
                .height
                .map_or(DEFAULT_IMAGE_HEIGHT, |h| u16::try_from(h.min(480)).unwrap_or(480));
            build_jpeg(width, height)
        }
        SynthKind::Wav => build_wav(
            hints
                .duration_secs
                .map_or(DEFAULT_AUDIO_SECONDS, f64::from),
            DEFAULT_AUDIO_FREQUENCY,
            DEFAULT_SAMPLE_RATE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(SynthKind::from_filename("a.mp4"), Some(SynthKind::Mp4));
        assert_eq!(SynthKind::from_filename("a.JPEG"), Some(SynthKind::Jpeg));
        assert_eq!(SynthKind::from_filename("a.wav"), Some(SynthKind::Wav));
        assert_eq!(SynthKind::from_filename("a.mp3"), None);
        assert_eq!(SynthKind::from_filename("README"), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("video".parse::<SynthKind>(), Ok(SynthKind::Mp4));
        assert_eq!(".JPG".parse::<SynthKind>(), Ok(SynthKind::Jpeg));
        assert_eq!("audio".parse::<SynthKind>(), Ok(SynthKind::Wav));
        assert!("gif".parse::<SynthKind>().is_err());
    }

    #[test]
    fn test_hints_from_filename() {
        let hints = SynthHints::from_filename("youtube_abc_720p.mp4", 0);
        assert_eq!(hints.height, Some(720));
        assert_eq!(hints.width, Some(1280));

        let hints = SynthHints::from_filename("sample_video.mp4", 0);
        assert_eq!(hints.height, None);
    }

    #[test]
    fn test_synthesize_dispatch() {
        let hints = SynthHints::default();
        assert_eq!(&synthesize(SynthKind::Mp4, &hints)[4..8], b"ftyp");
        assert_eq!(&synthesize(SynthKind::Jpeg, &hints)[0..2], &[0xFF, 0xD8]);
        assert_eq!(&synthesize(SynthKind::Wav, &hints)[0..4], b"RIFF");
    }
}
