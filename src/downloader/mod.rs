// Download pipeline - resolve, select quality, download, log history

pub mod backends;
pub mod config;
pub mod errors;
pub mod estimate;
pub mod history;
pub mod models;
pub mod quality;
pub mod resolver;
pub mod session;
pub mod traits;
pub mod utils;

pub use config::DownloadConfig;
pub use errors::{FetchError, HistoryError, SessionError};
pub use history::HistoryStore;
pub use models::{
    DownloadResult, DownloadStatus, DownloadedFile, FormatSpec, Item, MediaSource, Mode,
    QualityChoice, Session,
};
pub use resolver::ItemResolver;
pub use session::DownloadSession;
pub use traits::{Fetcher, LogObserver, ProgressObserver};
