// HistoryStore - cumulative JSON history keyed by session id

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::HistoryError;
use super::models::{DownloadResult, Session};

/// Persisted mapping session_id -> results, accumulated across runs.
/// Human-diffable pretty JSON, merged on every append.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted history. An absent file is a normal first run;
    /// an unreadable or corrupt file degrades to an empty base with a
    /// warning so the subsequent write is never blocked.
    pub fn load(&self) -> BTreeMap<String, Vec<DownloadResult>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                log::warn!("Could not read history file {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(history) => history,
            Err(e) => {
                log::warn!(
                    "Corrupt history file {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Merges the session into the stored history. Session ids are unique
    /// per run by construction, so this is an insert; re-appending the
    /// same session is idempotent. The document is written to a temp file
    /// in the same directory and renamed over the target so unrelated
    /// sessions are never left half-written.
    pub fn append(&self, session: &Session) -> Result<(), HistoryError> {
        let mut history = self.load();
        history.insert(session.session_id.clone(), session.results.clone());

        let json = serde_json::to_string_pretty(&history)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
