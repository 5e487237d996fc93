//! HTTP download client
//!
//! This module fetches single remote resources to local files:
//! - Building the HTTP client (timeout, optional proxy, browser user agent)
//! - Attaching basic or bearer authentication
//! - Retrying failed attempts with a fixed, cancellable delay
//! - Streaming a successful response body to disk

use crate::config::{AuthMethod, CrawlConfig, ProxySettings};
use crate::paths::{safe_create_file, sanitize_path};
use crate::DownloadError;
use reqwest::{Client, Proxy, RequestBuilder, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// User agent sent with every request; some repository front-ends reject
/// non-browser clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Builds an HTTP client with the request timeout and optional proxy
///
/// Response bodies are written to disk exactly as served, so transparent
/// decompression stays off.
///
/// # Arguments
///
/// * `timeout` - Total time allowed for one request, body included
/// * `proxy` - HTTP proxy that every request is routed through
///
/// # Example
///
/// ```no_run
/// use arti_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(10), None).unwrap();
/// ```
pub fn build_http_client(
    timeout: Duration,
    proxy: Option<&ProxySettings>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(timeout);

    if let Some(settings) = proxy {
        let mut proxy = Proxy::all(settings.url())?;
        if let Some((username, password)) = settings.credentials() {
            proxy = proxy.basic_auth(username, password);
        }
        builder = builder.proxy(proxy);
    }

    builder.build()
}

/// Sleeps for `delay` unless `cancel` fires first
///
/// Returns `false` if the sleep was interrupted by cancellation.
pub async fn cancellable_sleep(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Downloads remote files with retry
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    auth: AuthMethod,
    retry_attempts: u32,
    delay: Duration,
    cancel: CancellationToken,
}

impl Downloader {
    /// Creates a downloader from the crawl settings
    ///
    /// # Errors
    ///
    /// * `DownloadError::Client` - The HTTP client could not be built (bad proxy URL, TLS backend)
    pub fn new(config: &CrawlConfig, cancel: CancellationToken) -> Result<Self, DownloadError> {
        let client = build_http_client(config.timeout, config.proxy.as_ref())
            .map_err(DownloadError::Client)?;

        Ok(Self {
            client,
            auth: config.auth.clone(),
            retry_attempts: config.retry_attempts,
            delay: config.delay,
            cancel,
        })
    }

    /// Number of attempts made per download; at least one
    pub fn attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.auth {
            AuthMethod::None => request,
            AuthMethod::Basic { username, password } => request.basic_auth(username, Some(password)),
            AuthMethod::Token(token) => request.bearer_auth(token),
        }
    }

    /// Sends one GET; anything but `200 OK` is an error
    async fn attempt(&self, url: &str) -> Result<Response, DownloadError> {
        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(DownloadError::Cancelled { url: url.to_string() });
            }
            sent = self.request(url).send() => sent,
        };

        let response = sent.map_err(|source| DownloadError::Network {
            url: url.to_string(),
            source,
        })?;

        if response.status() != StatusCode::OK {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    /// Downloads `url` into `local`, returning the number of bytes written
    ///
    /// # Retry Logic
    ///
    /// Up to [`attempts`](Self::attempts) requests are made. A transport
    /// error or a status other than 200 is retried after the configured
    /// delay, except after the last attempt; the last failure is returned.
    /// Once a 200 response arrives, a failure while writing the body is
    /// returned immediately and the partial file is removed.
    ///
    /// # Errors
    ///
    /// * `DownloadError::Network` / `DownloadError::HttpStatus` - All attempts failed
    /// * `DownloadError::Path` / `DownloadError::Io` - The local file could not be written
    /// * `DownloadError::Cancelled` - The cancellation token fired
    pub async fn download(&self, url: &str, local: &Path) -> Result<u64, DownloadError> {
        let local = sanitize_path(local);
        let attempts = self.attempts();
        let mut attempt = 1;

        let response = loop {
            let error = match self.attempt(url).await {
                Ok(response) => break response,
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => e,
            };

            if attempt >= attempts {
                return Err(error);
            }

            tracing::debug!("Attempt {}/{} for {} failed: {}", attempt, attempts, url, error);
            if !cancellable_sleep(self.delay, &self.cancel).await {
                return Err(DownloadError::Cancelled {
                    url: url.to_string(),
                });
            }
            attempt += 1;
        };

        let written = match write_body(response, url, &local).await {
            Ok(written) => written,
            Err(e) => {
                tracing::debug!("Removing partial file {}", local.display());
                let _ = tokio::fs::remove_file(&local).await;
                return Err(e);
            }
        };

        tracing::debug!("Wrote {} bytes to {}", written, local.display());
        Ok(written)
    }
}

async fn write_body(mut response: Response, url: &str, path: &Path) -> Result<u64, DownloadError> {
    let mut file = safe_create_file(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| DownloadError::Network {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(written)
}
