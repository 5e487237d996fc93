//! Arti-Mirror: recursive mirroring of repository directory listings
//!
//! This crate walks the HTML index pages that a binary-artifact repository
//! manager generates for its repositories, downloads the files whose names
//! pass the configured inclusion filter, and reproduces the remote directory
//! hierarchy on local storage.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod paths;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

pub use paths::PathError;

/// Main error type for Arti-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Filesystem error: {0}")]
    Path(#[from] PathError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Failed to scan index page {}: {source}", path.display())]
    IndexScan {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run cancelled")]
    Cancelled,
}

impl MirrorError {
    /// Returns true if the run stopped because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Download(DownloadError::Cancelled { .. })
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Repository list {}: {message}", path.display())]
    RepoList { path: PathBuf, message: String },
}

/// Errors raised by a single download
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download {url}: status code {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error writing to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("download of {url} cancelled")]
    Cancelled { url: String },
}

impl DownloadError {
    /// Returns the HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type alias for Arti-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{Coordinator, Downloader, IndexCrawler};
pub use filter::{classify, should_include, EntryKind, FilterMode, FilterSettings};
pub use state::{CrawlStats, TransientLedger};
