//! Counters collected while mirroring

use chrono::{DateTime, Utc};

/// Run statistics
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Files fetched and written
    pub files_downloaded: u64,

    /// Files skipped because the target already existed
    pub files_existing: u64,

    /// Files whose download failed and was written to the failure log
    pub files_failed: u64,

    /// Subdirectories entered
    pub directories_entered: u64,

    /// Index pages fetched, repository roots included
    pub index_pages: u64,

    /// Entries skipped by the traversal policy
    pub entries_skipped: u64,

    pub repositories_processed: u64,
    pub repositories_failed: u64,
    pub index_files_removed: u64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            files_downloaded: 0,
            files_existing: 0,
            files_failed: 0,
            directories_entered: 0,
            index_pages: 0,
            entries_skipped: 0,
            repositories_processed: 0,
            repositories_failed: 0,
            index_files_removed: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, if it has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Logs a one-line summary of the run
    pub fn log_summary(&self) {
        tracing::info!(
            "Run finished: {} downloaded, {} already present, {} failed, {} directories, {}/{} repositories ok, {}s",
            self.files_downloaded,
            self.files_existing,
            self.files_failed,
            self.directories_entered,
            self.repositories_processed.saturating_sub(self.repositories_failed),
            self.repositories_processed,
            self.duration_seconds().unwrap_or(0)
        );
    }
}
