// Common data models for the download pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum length of a recorded failure reason.
pub const MAX_REASON_LEN: usize = 100;

/// Download mode: full video or audio-only extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Video,
    Audio,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// One resolved media item (single video or playlist entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    /// Canonical URL reported by the engine
    pub source_url: String,
    /// Seconds; 0 when metadata was shallow or the field was absent
    pub duration_seconds: f64,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        source_url: impl Into<String>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            duration_seconds: duration_seconds.max(0.0),
        }
    }
}

/// What the session is asked to download: either a bare URL (shallow
/// playlist entry, batch line) or a fully resolved item.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    Unresolved(String),
    Resolved(Item),
}

impl MediaSource {
    pub fn url(&self) -> &str {
        match self {
            Self::Unresolved(url) => url,
            Self::Resolved(item) => &item.source_url,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Unresolved(_) => None,
            Self::Resolved(item) => Some(&item.title),
        }
    }
}

/// Quality chosen once per session, applied uniformly to all items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityChoice {
    VideoQuality {
        /// "1080p", "720p", "480p", "360p" or "best"
        label: String,
        /// Representative bitrate used only for size projection
        target_bitrate_kbps: u32,
    },
    AudioBitrate {
        /// "128", "192", "256" or "320"
        label: String,
        kbps: u32,
    },
}

impl QualityChoice {
    pub fn label(&self) -> &str {
        match self {
            Self::VideoQuality { label, .. } => label,
            Self::AudioBitrate { label, .. } => label,
        }
    }

    pub fn bitrate_kbps(&self) -> u32 {
        match self {
            Self::VideoQuality {
                target_bitrate_kbps,
                ..
            } => *target_bitrate_kbps,
            Self::AudioBitrate { kbps, .. } => *kbps,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::VideoQuality { .. } => Mode::Video,
            Self::AudioBitrate { .. } => Mode::Audio,
        }
    }
}

/// Engine-specific selector derived from a QualityChoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub mode: Mode,
    /// yt-dlp `-f` selector string
    pub selector: String,
    /// Target MP3 bitrate for the audio transcode postprocessor
    pub audio_quality: Option<String>,
}

/// Outcome of one item's download attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DownloadStatus {
    Success,
    /// The engine reported an error for this item
    Failed(String),
    /// The engine reported success but the output file is missing
    Unknown,
}

impl DownloadStatus {
    /// Build a Failed status with the reason truncated for loggability
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::Failed(reason.chars().take(MAX_REASON_LEN).collect())
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One record per item per session attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub title: String,
    pub source_url: String,
    pub output_path: String,
    #[serde(flatten)]
    pub status: DownloadStatus,
    /// "<height>p" when the engine reported a height, else "N/A"
    pub resolution: String,
}

/// One end-to-end run: identity fixed at start, results immutable after
/// finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub results: Vec<DownloadResult>,
}

/// What the engine hands back after a download attempt
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub title: String,
    pub source_url: String,
    pub path: PathBuf,
    /// Height in pixels when the engine could determine it
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_status_truncates_long_reasons() {
        let long = "x".repeat(500);
        match DownloadStatus::failed(long) {
            DownloadStatus::Failed(reason) => assert_eq!(reason.len(), MAX_REASON_LEN),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn media_source_exposes_url_uniformly() {
        let raw = MediaSource::Unresolved("https://youtu.be/abc".to_string());
        let resolved = MediaSource::Resolved(Item::new("clip", "https://youtu.be/abc", 10.0));
        assert_eq!(raw.url(), "https://youtu.be/abc");
        assert_eq!(resolved.url(), "https://youtu.be/abc");
        assert_eq!(raw.title(), None);
        assert_eq!(resolved.title(), Some("clip"));
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        let item = Item::new("t", "u", -3.0);
        assert_eq!(item.duration_seconds, 0.0);
    }
}
