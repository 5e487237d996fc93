//! Crawler module for mirroring repository listings
//!
//! This module contains the mirroring engine, including:
//! - HTTP downloads with retry, authentication and proxy support
//! - Extraction of listing entries from index pages
//! - Depth-first traversal of a repository's index pages
//! - Batch processing of a repository list
//! - Logging of failed downloads as retry commands

mod coordinator;
mod failure_log;
mod fetcher;
mod parser;
mod walker;

pub use coordinator::Coordinator;
pub use failure_log::FailureLog;
pub use fetcher::{build_http_client, cancellable_sleep, Downloader, BROWSER_USER_AGENT};
pub use parser::{is_anchor_line, parse_listing, parse_listing_line, DirectoryEntry};
pub use walker::{
    ensure_trailing_slash, entry_directory, index_file_name, join_remote, repo_index_file_name,
    IndexCrawler,
};

use crate::config::{resolve_repositories, Config, CrawlConfig};
use crate::state::CrawlStats;
use crate::MirrorError;
use tokio_util::sync::CancellationToken;

/// Runs a complete mirroring session
///
/// This is the main entry point for a run. It will:
/// 1. Resolve the repository list
/// 2. Derive the crawl settings
/// 3. Mirror every repository in turn
/// 4. Remove the transient index pages
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `cancel` - Stops the run when triggered
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Run completed, possibly with logged download failures
/// * `Err(MirrorError)` - Repository list, directory setup or cancellation failure
pub async fn crawl(config: &Config, cancel: CancellationToken) -> Result<CrawlStats, MirrorError> {
    let repositories = resolve_repositories(config)?;
    tracing::info!("{} repositories to mirror", repositories.len());

    let crawl_config = CrawlConfig::from_config(config);
    Coordinator::with_cancellation(crawl_config, cancel)?
        .run(&repositories)
        .await
}
