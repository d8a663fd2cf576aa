// onedl - CLI front end for the download pipeline

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use onedl_lib::downloader::backends::YtDlpFetcher;
use onedl_lib::downloader::quality;
use onedl_lib::downloader::{
    DownloadConfig, DownloadSession, FormatSpec, HistoryStore, Item, ItemResolver, LogObserver,
    MediaSource, Mode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Video,
    Audio,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Video => Mode::Video,
            ModeArg::Audio => Mode::Audio,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "onedl", about = "YouTube downloader driving yt-dlp", version)]
struct Args {
    /// Video or playlist URL
    url: Option<String>,

    /// Treat the given URL as a playlist (sequential)
    #[arg(long)]
    playlist: bool,

    /// Download mode
    #[arg(long, value_enum, default_value_t = ModeArg::Video)]
    mode: ModeArg,

    /// Quality choice key (video 1-5, audio 1-4); defaults when omitted
    #[arg(long)]
    quality: Option<String>,

    /// Path to a cookies.txt file
    #[arg(long)]
    cookiefile: Option<PathBuf>,

    /// Save directory (default: per-platform downloads folder)
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// File with one URL per line; blank lines and # comments are skipped
    #[arg(long)]
    batch_file: Option<PathBuf>,

    /// Set downloaded files' mtime to now instead of the source timestamp
    #[arg(long)]
    force_current_mtime: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mode = Mode::from(args.mode);
    let mut config = DownloadConfig::default()
        .with_cookie_file(args.cookiefile)
        .with_force_current_mtime(args.force_current_mtime);
    if let Some(path) = args.save_path {
        config = config.with_save_path(path);
    }

    let fetcher = YtDlpFetcher::new();
    let resolver = ItemResolver::new(&fetcher);
    let cookie = config.cookie_file.clone();

    // Resolve the requested URL(s) into download sources
    let (sources, resolved_items) = if let Some(batch) = &args.batch_file {
        let urls = match read_batch_file(batch) {
            Ok(urls) if !urls.is_empty() => urls,
            Ok(_) => {
                log::error!("Batch file {} contains no URLs", batch.display());
                return ExitCode::FAILURE;
            }
            Err(e) => {
                log::error!("Could not read batch file {}: {}", batch.display(), e);
                return ExitCode::FAILURE;
            }
        };
        (urls.into_iter().map(MediaSource::Unresolved).collect(), vec![])
    } else {
        let url = match &args.url {
            Some(url) => url.clone(),
            None => {
                log::error!("No URL given; pass a URL or --batch-file");
                return ExitCode::FAILURE;
            }
        };

        log::info!("Fetching {} information...", if args.playlist { "playlist" } else { "video" });
        let items = match resolver.resolve(&url, args.playlist, cookie.as_deref()).await {
            Ok(items) => items,
            Err(e) => {
                // Fatal: nothing to download, no history entry is written
                log::error!("Could not fetch info for {}: {}", url, e);
                return ExitCode::FAILURE;
            }
        };
        (
            items.iter().cloned().map(MediaSource::Resolved).collect::<Vec<_>>(),
            items,
        )
    };

    // The size table is a decision aid; skip it when the choice was
    // already made on the command line
    if args.quality.is_none() {
        print_projection(&resolved_items, mode);
    }

    let choice = quality::resolve_choice(mode, args.quality.as_deref().unwrap_or(""));
    log::info!("Selected {} quality: {}", mode, choice.label());
    let spec = FormatSpec::from_choice(&choice);

    let observer = LogObserver;
    let session_runner = DownloadSession::new(&fetcher, config.clone()).with_observer(&observer);
    let session = match session_runner.run(&sources, &spec).await {
        Ok(session) => session,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = HistoryStore::new(config.history_file());
    if let Err(e) = store.append(&session) {
        log::error!("Could not record session history: {}", e);
    } else {
        log::info!(
            "Session {} recorded in {}",
            session.session_id,
            store.path().display()
        );
    }

    ExitCode::SUCCESS
}

/// Size projections per quality option, shown before committing. Shallow
/// or batch sources have duration 0 and project to 0 MB.
fn print_projection(items: &[Item], mode: Mode) {
    if items.is_empty() {
        return;
    }
    println!("Projected sizes ({} item(s)):", items.len());
    for (opt, total_mb) in quality::project(items, mode) {
        match mode {
            Mode::Video => println!("{}. {} - approx. {} MB", opt.key, opt.label, total_mb),
            Mode::Audio => println!("{}. {} kbps - approx. {} MB", opt.key, opt.label, total_mb),
        }
    }
}

fn read_batch_file(path: &PathBuf) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_flag_suppresses_the_projection_table() {
        let args = Args::parse_from(["onedl", "https://v/1"]);
        assert!(args.quality.is_none());

        let args = Args::parse_from(["onedl", "https://v/1", "--quality", "2"]);
        assert_eq!(args.quality.as_deref(), Some("2"));
    }

    #[test]
    fn batch_file_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("urls.txt");
        std::fs::write(&batch, "https://v/1\n\n# comment\n  https://v/2  \n").unwrap();

        let urls = read_batch_file(&batch).unwrap();
        assert_eq!(urls, ["https://v/1", "https://v/2"]);
    }
}
