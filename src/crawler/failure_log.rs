//! Reproducible retry commands for downloads that exhausted their attempts

use crate::config::CrawlConfig;
use crate::paths::{ensure_directory_exists, PathError};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append-only log of failed downloads
///
/// Each line is a `wget` invocation that retries one download by hand with
/// the same timeout and attempt count as the run.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
    timeout_secs: u64,
    retry_attempts: u32,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>, timeout_secs: u64, retry_attempts: u32) -> Self {
        Self {
            path: path.into(),
            timeout_secs,
            retry_attempts,
        }
    }

    /// Failure log at the configured export location
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(
            config.failure_log_path(),
            config.timeout.as_secs(),
            config.retry_attempts.max(1),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Formats the retry command for one failed download
    ///
    /// # Example
    ///
    /// ```
    /// use arti_mirror::crawler::FailureLog;
    /// use std::path::Path;
    ///
    /// let log = FailureLog::new("/tmp/failed_download.txt", 10, 3);
    /// assert_eq!(
    ///     log.retry_command(Path::new("out/a.jar"), "http://repo/a.jar"),
    ///     "wget --timeout=10 --tries=3 -O out/a.jar http://repo/a.jar"
    /// );
    /// ```
    pub fn retry_command(&self, target: &Path, url: &str) -> String {
        format!(
            "wget --timeout={} --tries={} -O {} {}",
            self.timeout_secs,
            self.retry_attempts,
            quote_argument(&target.to_string_lossy()),
            url
        )
    }

    /// Appends the retry command for a failed download, creating the log if needed
    pub async fn record(&self, target: &Path, url: &str) -> Result<(), PathError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_directory_exists(parent).await?;
        }

        let io_error = |source| PathError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_error)?;

        let line = format!("{}\n", self.retry_command(target, url));
        file.write_all(line.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        tracing::debug!("Recorded retry command for {} in {}", url, self.path.display());
        Ok(())
    }
}

fn quote_argument(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}
