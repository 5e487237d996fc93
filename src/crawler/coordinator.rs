//! Repository batch runner
//!
//! Mirrors a list of repositories one after another with a single
//! [`IndexCrawler`]:
//! - Prepares the output and export directories
//! - Fetches and walks each repository's root index
//! - Keeps going when one repository fails
//! - Removes the transient index pages once every repository is done

use crate::config::CrawlConfig;
use crate::crawler::walker::{ensure_trailing_slash, join_remote, repo_index_file_name, IndexCrawler};
use crate::paths::{ensure_directory_exists, safe_join};
use crate::state::CrawlStats;
use crate::MirrorError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs one mirroring session over a list of repositories
#[derive(Debug)]
pub struct Coordinator {
    crawler: IndexCrawler,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator with its own cancellation token
    pub fn new(config: CrawlConfig) -> Result<Self, MirrorError> {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Creates a coordinator that stops when `cancel` fires
    ///
    /// # Errors
    ///
    /// * `MirrorError::Download` - The HTTP client could not be built
    pub fn with_cancellation(
        config: CrawlConfig,
        cancel: CancellationToken,
    ) -> Result<Self, MirrorError> {
        let crawler = IndexCrawler::new(config, cancel.clone())?;
        Ok(Self { crawler, cancel })
    }

    /// Token that cancels this run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Mirrors every repository in `repositories`
    ///
    /// Blank entries are ignored and entries are trimmed. A repository whose
    /// index cannot be fetched or scanned is logged and counted as failed;
    /// the batch continues with the next one. Index pages are removed at the
    /// end unless index cleanup is disabled, also after cancellation.
    ///
    /// # Errors
    ///
    /// * `MirrorError::Path` - The output or export directory cannot be prepared
    /// * `MirrorError::Cancelled` - The run was cancelled
    pub async fn run(mut self, repositories: &[String]) -> Result<CrawlStats, MirrorError> {
        let output_dir = ensure_directory_exists(&self.crawler.config().output_dir).await?;
        let export_dir = ensure_directory_exists(&self.crawler.config().export_dir).await?;
        tracing::debug!("Failure log directory: {}", export_dir.display());

        if self.crawler.config().concurrent_downloads > 1 {
            tracing::debug!(
                "concurrent_downloads = {} ignored, mirroring sequentially",
                self.crawler.config().concurrent_downloads
            );
        }

        let mut outcome = Ok(());

        for repo in repositories.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
            if self.cancel.is_cancelled() {
                outcome = Err(MirrorError::Cancelled);
                break;
            }

            tracing::info!("Processing repository {}", repo);
            self.crawler.stats_mut().repositories_processed += 1;

            match self.mirror_repository(repo, &output_dir).await {
                Ok(()) => tracing::info!("Finished repository {}", repo),
                Err(MirrorError::Cancelled) => {
                    outcome = Err(MirrorError::Cancelled);
                    break;
                }
                Err(e) => {
                    tracing::error!("Repository {} failed: {}", repo, e);
                    self.crawler.stats_mut().repositories_failed += 1;
                }
            }
        }

        let ledger = self.crawler.take_ledger();
        if self.crawler.config().clean_index_files {
            tracing::info!("Removing {} index files", ledger.len());
            let report = ledger.cleanup().await;
            if !report.is_clean() {
                tracing::warn!("{} index files could not be removed", report.failed.len());
            }
            self.crawler.stats_mut().index_files_removed = report.removed as u64;
        } else {
            tracing::info!("Keeping {} index files", ledger.len());
        }

        let mut stats = self.crawler.stats().clone();
        stats.finish();
        stats.log_summary();

        if outcome.is_err() {
            tracing::warn!("Run cancelled");
        }
        outcome.map(|()| stats)
    }

    async fn mirror_repository(&mut self, repo: &str, output_dir: &Path) -> Result<(), MirrorError> {
        let repo_url = ensure_trailing_slash(&join_remote(
            &self.crawler.config().base_url,
            repo.trim_start_matches('/'),
        ));
        let index_file = safe_join(output_dir, &[repo_index_file_name(repo).as_str()]);

        match self.crawler.fetch_index(&repo_url, &index_file).await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => return Err(e.into()),
        }

        self.crawler.parse_index(&index_file, output_dir, &repo_url).await
    }
}
