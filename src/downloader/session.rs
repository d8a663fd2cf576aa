// DownloadSession - sequential per-item orchestration with
// partial-failure isolation

use time::macros::format_description;
use time::OffsetDateTime;

use super::config::DownloadConfig;
use super::errors::SessionError;
use super::models::{DownloadResult, DownloadStatus, FormatSpec, MediaSource, Session};
use super::traits::{Fetcher, ProgressObserver};

/// Orchestrates one run: creates the save directory, downloads each
/// source strictly one at a time in order, converts per-item errors into
/// Failed results, and finalizes a Session for the history store.
pub struct DownloadSession<'a> {
    fetcher: &'a dyn Fetcher,
    config: DownloadConfig,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> DownloadSession<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, config: DownloadConfig) -> Self {
        Self {
            fetcher,
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Runs the whole session. Only directory creation fails the run;
    /// each item's outcome is captured in its own DownloadResult and a
    /// failure never disturbs the ordering or presence of the others.
    pub async fn run(
        &self,
        sources: &[MediaSource],
        spec: &FormatSpec,
    ) -> Result<Session, SessionError> {
        std::fs::create_dir_all(&self.config.save_path).map_err(SessionError::SaveDir)?;

        let session_id = new_session_id();
        let total = sources.len();
        let mut results = Vec::with_capacity(total);

        for (idx, source) in sources.iter().enumerate() {
            if let Some(observer) = self.observer {
                observer.on_item_start(idx + 1, total, source.url());
            }

            let result = match self.fetcher.download(source, spec, &self.config).await {
                Ok(file) => {
                    // A reported success without the artifact on disk is a
                    // silent engine failure; record it as unknown, not success.
                    let status = if file.path.is_file() {
                        DownloadStatus::Success
                    } else {
                        log::warn!(
                            "Engine reported success but {} is missing",
                            file.path.display()
                        );
                        DownloadStatus::Unknown
                    };
                    let resolution = file
                        .height
                        .map(|h| format!("{}p", h))
                        .unwrap_or_else(|| "N/A".to_string());
                    DownloadResult {
                        title: file.title,
                        source_url: file.source_url,
                        output_path: file.path.to_string_lossy().to_string(),
                        status,
                        resolution,
                    }
                }
                Err(e) => {
                    log::error!("Failed to download {}: {}", source.url(), e);
                    DownloadResult {
                        title: source.title().unwrap_or("N/A").to_string(),
                        source_url: source.url().to_string(),
                        output_path: "N/A".to_string(),
                        status: DownloadStatus::failed(e.to_string()),
                        resolution: "N/A".to_string(),
                    }
                }
            };

            if let Some(observer) = self.observer {
                observer.on_item_finished(idx + 1, total, &result);
            }
            results.push(result);
        }

        Ok(Session {
            session_id,
            results,
        })
    }
}

/// Session identity: local-time ISO-8601 string with second precision,
/// fixed at session start.
pub fn new_session_id() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    now.format(&format)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::FetchError;
    use crate::downloader::models::{DownloadedFile, Item, Mode, MAX_REASON_LEN};
    use crate::downloader::traits::Fetcher;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    /// Per-URL scripted engine: urls listed in `fail` error out, urls in
    /// `ghost` report success without writing the file.
    struct ScriptedFetcher {
        dir: PathBuf,
        fail: Vec<String>,
        ghost: Vec<String>,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_metadata(
            &self,
            _url: &str,
            _shallow: bool,
            _cookie_file: Option<&Path>,
        ) -> Result<Vec<Item>, FetchError> {
            Ok(vec![])
        }

        async fn download(
            &self,
            source: &MediaSource,
            _spec: &FormatSpec,
            _config: &DownloadConfig,
        ) -> Result<DownloadedFile, FetchError> {
            let url = source.url().to_string();
            if self.fail.contains(&url) {
                return Err(FetchError::ExecutionError(format!("scripted failure for {}", url)));
            }

            let name = url.rsplit('/').next().unwrap_or("out");
            let path = self.dir.join(format!("{}.mp4", name));
            if !self.ghost.contains(&url) {
                std::fs::write(&path, b"data").unwrap();
            }
            Ok(DownloadedFile {
                title: name.to_string(),
                source_url: url,
                path,
                height: Some(720),
            })
        }
    }

    fn sources(n: usize) -> Vec<MediaSource> {
        (0..n)
            .map(|i| MediaSource::Unresolved(format!("https://v/{}", i)))
            .collect()
    }

    fn spec() -> FormatSpec {
        FormatSpec {
            mode: Mode::Video,
            selector: "best".to_string(),
            audio_quality: None,
        }
    }

    fn config(dir: &Path) -> DownloadConfig {
        DownloadConfig::default().with_save_path(dir.to_path_buf())
    }

    #[tokio::test]
    async fn one_failure_does_not_disturb_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ScriptedFetcher {
            dir: dir.path().to_path_buf(),
            fail: vec!["https://v/1".to_string()],
            ghost: vec![],
        };

        let session = DownloadSession::new(&fetcher, config(dir.path()))
            .run(&sources(3), &spec())
            .await
            .unwrap();

        assert_eq!(session.results.len(), 3);
        assert_eq!(session.results[0].status, DownloadStatus::Success);
        assert!(matches!(session.results[1].status, DownloadStatus::Failed(_)));
        assert_eq!(session.results[2].status, DownloadStatus::Success);
        // Ordering preserved
        assert_eq!(session.results[0].source_url, "https://v/0");
        assert_eq!(session.results[2].source_url, "https://v/2");
    }

    #[tokio::test]
    async fn missing_artifact_is_unknown_not_success() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ScriptedFetcher {
            dir: dir.path().to_path_buf(),
            fail: vec![],
            ghost: vec!["https://v/0".to_string()],
        };

        let session = DownloadSession::new(&fetcher, config(dir.path()))
            .run(&sources(1), &spec())
            .await
            .unwrap();

        assert_eq!(session.results[0].status, DownloadStatus::Unknown);
    }

    #[tokio::test]
    async fn success_records_path_and_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ScriptedFetcher {
            dir: dir.path().to_path_buf(),
            fail: vec![],
            ghost: vec![],
        };

        let session = DownloadSession::new(&fetcher, config(dir.path()))
            .run(&sources(1), &spec())
            .await
            .unwrap();

        let result = &session.results[0];
        assert_eq!(result.resolution, "720p");
        assert!(result.output_path.ends_with("0.mp4"));
        assert!(!session.session_id.is_empty());
    }

    #[tokio::test]
    async fn failure_reasons_are_truncated() {
        let dir = tempfile::tempdir().unwrap();

        struct VerboseFailure;

        #[async_trait]
        impl Fetcher for VerboseFailure {
            fn name(&self) -> &'static str {
                "verbose"
            }

            async fn fetch_metadata(
                &self,
                _url: &str,
                _shallow: bool,
                _cookie_file: Option<&Path>,
            ) -> Result<Vec<Item>, FetchError> {
                Ok(vec![])
            }

            async fn download(
                &self,
                _source: &MediaSource,
                _spec: &FormatSpec,
                _config: &DownloadConfig,
            ) -> Result<DownloadedFile, FetchError> {
                Err(FetchError::ExecutionError("e".repeat(400)))
            }
        }

        let session = DownloadSession::new(&VerboseFailure, config(dir.path()))
            .run(&sources(1), &spec())
            .await
            .unwrap();

        match &session.results[0].status {
            DownloadStatus::Failed(reason) => assert!(reason.len() <= MAX_REASON_LEN),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn save_dir_creation_failure_aborts_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let fetcher = ScriptedFetcher {
            dir: dir.path().to_path_buf(),
            fail: vec![],
            ghost: vec![],
        };
        let err = DownloadSession::new(&fetcher, config(&blocker))
            .run(&sources(1), &spec())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::SaveDir(_)));
    }

    #[test]
    fn session_ids_look_like_timestamps() {
        let id = new_session_id();
        // e.g. 2026-08-25T14:03:07
        assert_eq!(id.len(), 19);
        assert_eq!(&id[4..5], "-");
        assert_eq!(&id[10..11], "T");
    }
}
