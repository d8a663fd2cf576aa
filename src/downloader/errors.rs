// Error types for the download pipeline

use std::fmt;
use std::io;

/// Engine-level failure while fetching metadata or media
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Network timeout while talking to the video site
    NetworkTimeout,

    /// yt-dlp not found in system
    ToolNotFound(String),

    /// Invalid or unsupported URL
    InvalidUrl(String),

    /// Failed to parse engine JSON output
    ParseError(String),

    /// Command execution failed
    ExecutionError(String),

    /// Unknown error with details
    Unknown(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkTimeout => write!(f, "Network timeout: the site is not responding"),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            Self::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

// Heuristic classification of raw engine stderr
impl From<String> for FetchError {
    fn from(s: String) -> Self {
        if s.contains("timeout") || s.contains("timed out") {
            return Self::NetworkTimeout;
        }

        if s.contains("not found") || s.contains("No such file") || s.contains("command not found")
        {
            return Self::ToolNotFound(s);
        }

        if s.contains("parse") || s.contains("JSON") || s.contains("Invalid JSON") {
            return Self::ParseError(s);
        }

        if s.contains("Invalid URL") || s.contains("Unsupported URL") || s.contains("is not a valid URL") {
            return Self::InvalidUrl(s);
        }

        Self::Unknown(s)
    }
}

/// Failure that aborts a whole session before or during the item loop.
/// Per-item download errors never surface here; they become Failed results.
#[derive(Debug)]
pub enum SessionError {
    /// No metadata could be obtained for the requested URL/playlist
    Resolution(FetchError),

    /// The save directory could not be created
    SaveDir(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution(e) => write!(f, "Could not resolve URL: {}", e),
            Self::SaveDir(e) => write!(f, "Could not create save directory: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolution(e) => Some(e),
            Self::SaveDir(e) => Some(e),
        }
    }
}

impl From<FetchError> for SessionError {
    fn from(e: FetchError) -> Self {
        Self::Resolution(e)
    }
}

/// Failure writing the history file. Read corruption is only a warning.
#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "History file I/O error: {}", e),
            Self::Serialize(e) => write!(f, "History serialization error: {}", e),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialize(e) => Some(e),
        }
    }
}

impl From<io::Error> for HistoryError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}
