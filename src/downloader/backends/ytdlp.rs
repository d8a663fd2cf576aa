// yt-dlp backend - drives the native binary for metadata and downloads

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use crate::downloader::config::DownloadConfig;
use crate::downloader::errors::FetchError;
use crate::downloader::models::{DownloadedFile, FormatSpec, Item, MediaSource, Mode};
use crate::downloader::traits::Fetcher;
use crate::downloader::utils::run_output_with_timeout;

lazy_static! {
    // [download]  Destination: /path/Some Title.f137.mp4
    // [ExtractAudio] Destination: /path/Some Title.mp3
    static ref DEST_RE: Regex =
        Regex::new(r"\[(?:download|ExtractAudio)\]\s+Destination:\s+(.+)").unwrap();
    // [Merger] Merging formats into "/path/Some Title.mp4"
    static ref MERGER_RE: Regex =
        Regex::new(r#"\[Merger\] Merging formats into "(.+)""#).unwrap();
    // [download] /path/Some Title.mp4 has already been downloaded
    static ref ALREADY_RE: Regex =
        Regex::new(r"\[download\]\s+(.+?) has already been downloaded").unwrap();
}

const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 30;

/// Fetcher backed by the native `yt-dlp` binary
pub struct YtDlpFetcher {
    ytdlp_path: String,
    metadata_timeout_seconds: u64,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self {
            ytdlp_path: find_ytdlp(),
            metadata_timeout_seconds: DEFAULT_METADATA_TIMEOUT_SECS,
        }
    }

    /// Override the binary location (tests, unusual installs)
    pub fn with_binary(path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: path.into(),
            metadata_timeout_seconds: DEFAULT_METADATA_TIMEOUT_SECS,
        }
    }

    /// Bound metadata fetches; slow playlist expansions may need more
    /// than the default
    pub fn with_metadata_timeout(mut self, seconds: u64) -> Self {
        self.metadata_timeout_seconds = seconds;
        self
    }

    fn metadata_args(url: &str, shallow: bool, cookie_file: Option<&Path>) -> Vec<String> {
        let mut args: Vec<String> = if shallow {
            vec!["-J".into(), "--flat-playlist".into()]
        } else {
            vec!["--dump-json".into(), "--no-playlist".into()]
        };
        args.extend([
            "--no-warnings".into(),
            "--socket-timeout".into(),
            "15".into(),
            "--retries".into(),
            "2".into(),
        ]);
        if let Some(cookie) = cookie_file {
            args.push("--cookies".into());
            args.push(cookie.to_string_lossy().to_string());
        }
        args.push(url.to_string());
        args
    }

    fn download_args(source: &MediaSource, spec: &FormatSpec, config: &DownloadConfig) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-f".into(),
            spec.selector.clone(),
            "--newline".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--no-check-certificates".into(),
            "--no-overwrites".into(),
            "--no-cache-dir".into(),
            "--embed-thumbnail".into(),
            "-P".into(),
            config.save_path.to_string_lossy().to_string(),
            // Default template is "%(title)s [%(id)s].%(ext)s" - drop the [id]
            "-o".into(),
            "%(title)s.%(ext)s".into(),
        ];

        match spec.mode {
            Mode::Video => {
                args.push("--merge-output-format".into());
                args.push("mp4".into());
            }
            Mode::Audio => {
                args.push("-x".into());
                args.push("--audio-format".into());
                args.push("mp3".into());
                if let Some(quality) = &spec.audio_quality {
                    args.push("--audio-quality".into());
                    args.push(format!("{}K", quality));
                }
            }
        }

        if config.force_current_mtime {
            args.push("--no-mtime".into());
        }
        if let Some(cookie) = &config.cookie_file {
            args.push("--cookies".into());
            args.push(cookie.to_string_lossy().to_string());
        }

        args.push(source.url().to_string());
        args
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_metadata(
        &self,
        url: &str,
        shallow: bool,
        cookie_file: Option<&Path>,
    ) -> Result<Vec<Item>, FetchError> {
        let args = Self::metadata_args(url, shallow, cookie_file);
        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, self.metadata_timeout_seconds)
                .await?;

        if !output.status.success() {
            return Err(FetchError::from(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if shallow {
            parse_playlist_entries(&stdout)
        } else {
            parse_metadata_lines(&stdout, url)
        }
    }

    async fn download(
        &self,
        source: &MediaSource,
        spec: &FormatSpec,
        config: &DownloadConfig,
    ) -> Result<DownloadedFile, FetchError> {
        let args = Self::download_args(source, spec, config);
        log::debug!("Running {} with {:?}", self.ytdlp_path, args);

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, config.download_timeout_seconds)
                .await?;

        if !output.status.success() {
            return Err(FetchError::from(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = parse_output_path(&stdout)
            .unwrap_or_else(|| expected_output_path(source, spec, config));

        let title = source
            .title()
            .map(str::to_string)
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "Unknown Title".to_string());

        Ok(DownloadedFile {
            title,
            source_url: source.url().to_string(),
            path,
            // Text output does not carry the stream height
            height: None,
        })
    }
}

/// Locate yt-dlp in common install paths, falling back to `which`
fn find_ytdlp() -> String {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    // Hope it's in PATH
    "yt-dlp".to_string()
}

/// `--dump-json` prints one JSON object per line
fn parse_metadata_lines(stdout: &str, fallback_url: &str) -> Result<Vec<Item>, FetchError> {
    let mut items = Vec::new();
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| FetchError::ParseError(format!("Invalid JSON from yt-dlp: {}", e)))?;
        items.push(item_from_json(&value, fallback_url));
    }
    Ok(items)
}

/// `-J --flat-playlist` prints one document; playlists carry an
/// `entries` array of bare descriptors (no duration guaranteed)
fn parse_playlist_entries(stdout: &str) -> Result<Vec<Item>, FetchError> {
    let value: serde_json::Value = serde_json::from_str(stdout.trim())
        .map_err(|e| FetchError::ParseError(format!("Invalid JSON from yt-dlp: {}", e)))?;

    match value["entries"].as_array() {
        Some(entries) => Ok(entries
            .iter()
            .filter(|e| e["url"].is_string() || e["webpage_url"].is_string())
            .map(|e| item_from_json(e, ""))
            .collect()),
        // Not a playlist after all; treat the document as one item
        None => Ok(vec![item_from_json(&value, "")]),
    }
}

fn item_from_json(value: &serde_json::Value, fallback_url: &str) -> Item {
    let url = value["webpage_url"]
        .as_str()
        .or_else(|| value["url"].as_str())
        .unwrap_or(fallback_url);
    Item::new(
        value["title"].as_str().unwrap_or("Unknown Title"),
        url,
        value["duration"].as_f64().unwrap_or(0.0),
    )
}

/// Recover the final artifact path from yt-dlp's text output. The last
/// destination/merge/already-downloaded line wins, which matches the
/// engine's own ordering (fragments, then merge, then audio extraction).
fn parse_output_path(stdout: &str) -> Option<PathBuf> {
    let mut path = None;
    for line in stdout.lines() {
        if let Some(caps) = MERGER_RE
            .captures(line)
            .or_else(|| DEST_RE.captures(line))
            .or_else(|| ALREADY_RE.captures(line))
        {
            if let Some(m) = caps.get(1) {
                path = Some(PathBuf::from(m.as_str().trim()));
            }
        }
    }
    path
}

/// Where the output template would put the file if the engine printed
/// nothing recognizable. The session's existence check decides whether
/// the result is success or unknown.
fn expected_output_path(source: &MediaSource, spec: &FormatSpec, config: &DownloadConfig) -> PathBuf {
    let title = source.title().unwrap_or("Unknown Title");
    let ext = match spec.mode {
        Mode::Video => "mp4",
        Mode::Audio => "mp3",
    };
    config.save_path.join(format!("{}.{}", title, ext))
}
