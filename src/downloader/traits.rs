// Fetcher seam and progress reporting

use async_trait::async_trait;
use std::path::Path;

use super::config::DownloadConfig;
use super::errors::FetchError;
use super::models::{DownloadResult, DownloadedFile, FormatSpec, Item, MediaSource};

/// Trait for the external extraction-and-download engine
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Fetch metadata without downloading. With `shallow` a playlist is
    /// expanded to bare entries (URLs only, durations defaulted to 0);
    /// otherwise full metadata is fetched for the URL.
    async fn fetch_metadata(
        &self,
        url: &str,
        shallow: bool,
        cookie_file: Option<&Path>,
    ) -> Result<Vec<Item>, FetchError>;

    /// Fetch one item into `config.save_path` and run any post-processing
    /// (audio extraction, thumbnail embedding, muxing) internally. Returns
    /// the path of the final artifact as reported by the engine.
    async fn download(
        &self,
        source: &MediaSource,
        spec: &FormatSpec,
        config: &DownloadConfig,
    ) -> Result<DownloadedFile, FetchError>;
}

/// Receives per-item progress from a running session. Callbacks are
/// delivered on the session's own task; implementations must be cheap.
pub trait ProgressObserver: Send + Sync {
    fn on_item_start(&self, _index: usize, _total: usize, _url: &str) {}

    fn on_item_finished(&self, _index: usize, _total: usize, _result: &DownloadResult) {}
}

/// Observer that writes one log line per item outcome
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_item_start(&self, index: usize, total: usize, url: &str) {
        log::info!("[{}/{}] Downloading {}", index, total, url);
    }

    fn on_item_finished(&self, index: usize, total: usize, result: &DownloadResult) {
        log::info!(
            "[{}/{}] {} | {} | {} -> {} | Resolution: {}",
            index,
            total,
            result.status,
            result.title,
            result.source_url,
            result.output_path,
            result.resolution
        );
    }
}
