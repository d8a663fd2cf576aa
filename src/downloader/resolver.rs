// ItemResolver - turns a URL into an ordered list of items

use std::path::Path;

use super::errors::FetchError;
use super::models::Item;
use super::traits::Fetcher;

/// Resolves a single URL or a playlist into items via the engine's
/// metadata-only mode. Source order is preserved through to download
/// and history.
pub struct ItemResolver<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> ItemResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Playlists are expanded shallowly (URLs only, duration 0) to keep
    /// size estimation non-fatal; a single URL gets full metadata. An
    /// empty expansion is a resolution failure: the caller must abort
    /// the session before any download attempt.
    pub async fn resolve(
        &self,
        url: &str,
        is_playlist: bool,
        cookie_file: Option<&Path>,
    ) -> Result<Vec<Item>, FetchError> {
        let items = self
            .fetcher
            .fetch_metadata(url, is_playlist, cookie_file)
            .await?;

        if items.is_empty() {
            return Err(FetchError::Unknown(format!("No entries found for {}", url)));
        }

        log::info!(
            "Resolved {} item(s) from {} via {}",
            items.len(),
            url,
            self.fetcher.name()
        );
        Ok(items)
    }
}
