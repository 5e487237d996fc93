//! Index crawler
//!
//! Walks the index pages of one repository depth-first. For every page the
//! crawler:
//! 1. Records the local copy of the page in the transient ledger
//! 2. Scans it line by line for listing anchors
//! 3. Downloads entries classified as files
//! 4. Descends into entries classified as directories, fetching their index
//!
//! The local directory and remote base URL are threaded through the
//! recursion explicitly; the process working directory is never changed.

use crate::config::CrawlConfig;
use crate::crawler::failure_log::FailureLog;
use crate::crawler::fetcher::{cancellable_sleep, Downloader};
use crate::crawler::parser::{parse_listing_line, DirectoryEntry};
use crate::filter::{EntryKind, SkipReason};
use crate::paths::{ensure_directory_exists, safe_join, sanitize_filename, sanitize_path};
use crate::state::{CrawlStats, TransientLedger};
use crate::{DownloadError, MirrorError};
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use url::Url;

const INDEX_SUFFIX: &str = "-index.html";

/// Recursive crawler over repository index pages
///
/// One instance serves a whole run. It owns the ledger of index pages it
/// fetched and the run counters.
#[derive(Debug)]
pub struct IndexCrawler {
    config: CrawlConfig,
    downloader: Downloader,
    failure_log: FailureLog,
    ledger: TransientLedger,
    stats: CrawlStats,
    cancel: CancellationToken,
}

impl IndexCrawler {
    /// Creates a crawler for one run
    ///
    /// # Errors
    ///
    /// * `DownloadError::Client` - The HTTP client could not be built
    pub fn new(config: CrawlConfig, cancel: CancellationToken) -> Result<Self, DownloadError> {
        let downloader = Downloader::new(&config, cancel.clone())?;
        let failure_log = FailureLog::from_config(&config);

        Ok(Self {
            config,
            downloader,
            failure_log,
            ledger: TransientLedger::new(),
            stats: CrawlStats::new(),
            cancel,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn ledger(&self) -> &TransientLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CrawlStats {
        &mut self.stats
    }

    /// Hands over the ledger, leaving an empty one behind
    pub fn take_ledger(&mut self) -> TransientLedger {
        std::mem::take(&mut self.ledger)
    }

    /// Downloads an index page to `local`
    pub async fn fetch_index(&mut self, url: &str, local: &Path) -> Result<(), DownloadError> {
        tracing::debug!("Fetching index {} -> {}", url, local.display());
        self.downloader.download(url, local).await?;
        self.stats.index_pages += 1;
        Ok(())
    }

    /// Scans a downloaded index page and mirrors its entries
    ///
    /// `local_dir` is the directory the page's entries land in and
    /// `base_url` the remote location the page describes.
    ///
    /// Per-entry failures are logged and never end the scan. Only a read
    /// failure of the page itself or cancellation is returned.
    ///
    /// # Errors
    ///
    /// * `MirrorError::IndexScan` - The page could not be opened or read
    /// * `MirrorError::Cancelled` - The run was cancelled
    pub async fn parse_index(
        &mut self,
        index_file: &Path,
        local_dir: &Path,
        base_url: &str,
    ) -> Result<(), MirrorError> {
        let index_file = sanitize_path(index_file);
        self.ledger.record(&index_file);

        let scan_error = |source| MirrorError::IndexScan {
            path: index_file.clone(),
            source,
        };

        let file = File::open(&index_file).await.map_err(scan_error)?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await.map_err(scan_error)? == 0 {
                break;
            }

            if self.cancel.is_cancelled() {
                return Err(MirrorError::Cancelled);
            }

            // Listings are not guaranteed to be UTF-8
            let line = String::from_utf8_lossy(&buf);
            let Some(entry) = parse_listing_line(line.trim_end_matches(|c| c == '\n' || c == '\r'))
            else {
                continue;
            };

            self.handle_entry(&entry, local_dir, base_url).await?;
        }

        Ok(())
    }

    async fn handle_entry(
        &mut self,
        entry: &DirectoryEntry,
        local_dir: &Path,
        base_url: &str,
    ) -> Result<(), MirrorError> {
        match entry.classify(&self.config.filter) {
            EntryKind::File => self.mirror_file(entry, local_dir, base_url).await,
            EntryKind::Directory => self.descend(entry, local_dir, base_url).await,
            EntryKind::Skip(reason) => {
                match reason {
                    SkipReason::ParentReference => {
                        tracing::debug!("Skipping parent reference {}", entry.label)
                    }
                    SkipReason::DirectoryLabel => {
                        tracing::debug!("Skipping directory entry {} matched by filter", entry.label)
                    }
                }
                self.stats.entries_skipped += 1;
                Ok(())
            }
        }
    }

    /// Downloads one file entry unless it is already present
    ///
    /// A failed download goes to the failure log. The configured delay is
    /// observed after every attempt, successful or not.
    async fn mirror_file(
        &mut self,
        entry: &DirectoryEntry,
        local_dir: &Path,
        base_url: &str,
    ) -> Result<(), MirrorError> {
        if escapes_directory(&entry.label) {
            tracing::warn!("Skipping file entry outside its directory: {}", entry.label);
            self.stats.entries_skipped += 1;
            return Ok(());
        }

        let target = safe_join(local_dir, &[entry.label.as_str()]);

        if !self.config.force_replace && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tracing::debug!("Already present: {}", target.display());
            self.stats.files_existing += 1;
            return Ok(());
        }

        let url = join_remote(base_url, &entry.href);
        tracing::info!("Downloading {}", url);

        match self.downloader.download(&url, &target).await {
            Ok(bytes) => {
                tracing::info!("Saved {} ({} bytes)", target.display(), bytes);
                self.stats.files_downloaded += 1;
            }
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => {
                tracing::warn!("{}", e);
                self.stats.files_failed += 1;
                if let Err(log_error) = self.failure_log.record(&target, &url).await {
                    tracing::error!("Failed to write failure log: {}", log_error);
                }
            }
        }

        if !cancellable_sleep(self.config.delay, &self.cancel).await {
            return Err(MirrorError::Cancelled);
        }

        Ok(())
    }

    /// Creates the local directory for an entry, fetches its index and recurses
    ///
    /// Setup failures abort only this branch.
    async fn descend(
        &mut self,
        entry: &DirectoryEntry,
        local_dir: &Path,
        base_url: &str,
    ) -> Result<(), MirrorError> {
        let sub_dir = match ensure_directory_exists(entry_directory(local_dir, entry)).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("Cannot create directory for {}: {}", entry.label, e);
                return Ok(());
            }
        };

        let index_url = join_remote(base_url, &entry.href);
        let sub_base = ensure_trailing_slash(&index_url);
        let index_file = safe_join(&sub_dir, &[index_file_name(&entry.label).as_str()]);

        tracing::info!("Entering {}", sub_dir.display());
        self.stats.directories_entered += 1;

        match self.fetch_index(&index_url, &index_file).await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to fetch index of {}: {}", sub_dir.display(), e);
                return Ok(());
            }
        }

        match Box::pin(self.parse_index(&index_file, &sub_dir, &sub_base)).await {
            Err(MirrorError::Cancelled) => Err(MirrorError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to mirror {}: {}", sub_dir.display(), e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }
}

/// Appends `/` unless already present
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Resolves a listing href against the URL of the page it appeared on
///
/// Absolute URLs are used as-is and root-relative hrefs replace the path of
/// `base`. Everything else is appended to `base`, which is treated as a
/// directory.
///
/// # Example
///
/// ```
/// use arti_mirror::crawler::join_remote;
///
/// assert_eq!(
///     join_remote("http://repo/list/libs", "junit/"),
///     "http://repo/list/libs/junit/"
/// );
/// assert_eq!(join_remote("http://repo/list/libs/", "/other/"), "http://repo/other/");
/// ```
pub fn join_remote(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    if href.starts_with('/') {
        if let Ok(joined) = Url::parse(base).and_then(|base| base.join(href)) {
            return joined.to_string();
        }
    }

    format!("{}{}", ensure_trailing_slash(base), href)
}

/// Local file name of a subdirectory's index page
pub fn index_file_name(label: &str) -> String {
    sanitize_filename(&format!("{}{}", label.replace('/', ""), INDEX_SUFFIX))
}

/// Local file name of a repository's root index page
pub fn repo_index_file_name(repo: &str) -> String {
    sanitize_filename(&format!("{}{}", repo.replace('/', "_"), INDEX_SUFFIX))
}

/// Returns true if a file label would resolve outside the current directory
fn escapes_directory(label: &str) -> bool {
    Path::new(label)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
}

/// Local directory an entry would be mirrored into
pub fn entry_directory(local_dir: &Path, entry: &DirectoryEntry) -> PathBuf {
    safe_join(local_dir, &[entry.directory_name()])
}
