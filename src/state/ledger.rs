use crate::paths::sanitize_path;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Append-only list of index pages downloaded during a run
///
/// Paths are recorded as absolute paths so cleanup does not depend on the
/// directory the run was started from. The ledger is consumed by
/// [`TransientLedger::cleanup`].
#[derive(Debug, Default, Clone)]
pub struct TransientLedger {
    files: Vec<PathBuf>,
}

/// Outcome of removing the transient index pages
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files deleted
    pub removed: usize,

    /// Files that were already gone
    pub missing: usize,

    /// Files that could not be deleted
    pub failed: Vec<(PathBuf, std::io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl TransientLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an index page, whether or not it could be read
    pub fn record(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.files.push(absolute);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Attempts to delete every recorded file
    ///
    /// Failures are logged and collected; they never abort the cleanup.
    pub async fn cleanup(self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for file in self.files {
            let file = sanitize_path(&file);
            match tokio::fs::remove_file(&file).await {
                Ok(()) => {
                    tracing::debug!("Removed index file {}", file.display());
                    report.removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Index file {} already removed", file.display());
                    report.missing += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to remove index file {}: {}", file.display(), e);
                    report.failed.push((file, e));
                }
            }
        }

        report
    }
}
