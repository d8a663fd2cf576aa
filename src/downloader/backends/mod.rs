// Engine backends

pub mod ytdlp;

pub use ytdlp::YtDlpFetcher;
