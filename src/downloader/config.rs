// Session configuration and platform defaults

use std::path::{Path, PathBuf};

/// Configuration threaded through one download session
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory downloads land in; created if absent
    pub save_path: PathBuf,

    /// Path to a cookies.txt file, already validated to exist
    pub cookie_file: Option<PathBuf>,

    /// Force current mtime on downloaded files instead of preserving the
    /// source-reported timestamp
    pub force_current_mtime: bool,

    /// Timeout for a single item's download, seconds
    pub download_timeout_seconds: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            cookie_file: None,
            force_current_mtime: false,
            download_timeout_seconds: 6 * 60 * 60,
        }
    }
}

impl DownloadConfig {
    pub fn with_save_path(mut self, path: PathBuf) -> Self {
        self.save_path = path;
        self
    }

    /// Accepts a cookie file path only if it exists; a missing file is a
    /// warning, never a failure, and the session proceeds unauthenticated.
    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path.and_then(|p| validated_cookie_file(&p));
        self
    }

    pub fn with_force_current_mtime(mut self, force: bool) -> Self {
        self.force_current_mtime = force;
        self
    }

    /// The cumulative history file lives next to the downloads
    pub fn history_file(&self) -> PathBuf {
        self.save_path.join("download_history.json")
    }
}

/// Default save directory for the current platform. Pure detection, no
/// filesystem writes.
pub fn default_save_path() -> PathBuf {
    // Termux exposes shared storage under /storage/emulated/0
    if std::env::var_os("ANDROID_STORAGE").is_some() {
        return PathBuf::from("/storage/emulated/0/Download/termux");
    }

    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("video_downloader")
}

fn validated_cookie_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        log::info!("Using cookies from: {}", path.display());
        Some(path.to_path_buf())
    } else {
        log::warn!("Cookie file not found: {}", path.display());
        None
    }
}
