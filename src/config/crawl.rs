//! Immutable per-run settings handed to the crawler

use crate::config::types::{AuthType, Config};
use crate::filter::FilterSettings;
use crate::paths::sanitize_path;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the failure log inside the export directory
pub const FAILURE_LOG_FILE: &str = "failed_download.txt";

/// HTTP proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    /// Proxy URL in `http://host:port` form
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Credentials, only when both parts are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Authentication attached to every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Token(String),
}

/// Settings for one mirroring run
///
/// Built once from the validated file configuration and never mutated by
/// the crawler.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Listing base URL; repository paths are appended to it
    pub base_url: String,
    pub output_dir: PathBuf,

    /// Directory that receives the failure log
    pub export_dir: PathBuf,

    pub retry_attempts: u32,
    pub timeout: Duration,
    pub delay: Duration,
    pub proxy: Option<ProxySettings>,
    pub auth: AuthMethod,
    pub filter: FilterSettings,
    pub force_replace: bool,
    pub clean_index_files: bool,

    /// Parsed for compatibility; traversal is sequential
    pub concurrent_downloads: u32,
}

impl CrawlConfig {
    /// Creates settings with the stock defaults for a base URL and output directory
    pub fn new(base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            export_dir: default_export_dir(),
            retry_attempts: 3,
            timeout: Duration::from_secs(10),
            delay: Duration::from_secs(1),
            proxy: None,
            auth: AuthMethod::None,
            filter: FilterSettings::default(),
            force_replace: false,
            clean_index_files: true,
            concurrent_downloads: 1,
        }
    }

    /// Derives crawl settings from a validated configuration
    pub fn from_config(config: &Config) -> Self {
        let proxy = if config.proxy.enabled && !config.proxy.host.trim().is_empty() {
            u16::try_from(config.proxy.port)
                .ok()
                .filter(|port| *port > 0)
                .map(|port| ProxySettings {
                    host: config.proxy.host.trim().to_string(),
                    port,
                    username: config.proxy.username.clone(),
                    password: config.proxy.password.clone(),
                })
        } else {
            None
        };

        let auth = match config.auth.kind {
            AuthType::None => AuthMethod::None,
            AuthType::Basic => match (&config.auth.username, &config.auth.password) {
                (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                    AuthMethod::Basic {
                        username: username.clone(),
                        password: password.clone(),
                    }
                }
                _ => AuthMethod::None,
            },
            AuthType::Token => match &config.auth.access_token {
                Some(token) if !token.is_empty() => AuthMethod::Token(token.clone()),
                _ => AuthMethod::None,
            },
        };

        let export_dir = config
            .general
            .export_dir
            .as_deref()
            .map(|dir| sanitize_path(dir.trim()))
            .unwrap_or_else(default_export_dir);

        Self {
            base_url: config.artifactory.url.trim().to_string(),
            output_dir: sanitize_path(config.general.output_dir.trim()),
            export_dir,
            retry_attempts: config.download.retry_attempts,
            timeout: Duration::from_secs(config.download.timeout),
            delay: Duration::from_secs(config.download.delay),
            proxy,
            auth,
            filter: FilterSettings::new(
                config.files.filter_mode,
                &config.files.extensions,
                &config.artifactory.file_types,
                config.files.include_maven_metadata,
            ),
            force_replace: config.artifactory.force_replace,
            clean_index_files: config.files.clean_html_files,
            concurrent_downloads: config.general.concurrent_downloads,
        }
    }

    /// Full path of the failure log
    pub fn failure_log_path(&self) -> PathBuf {
        self.export_dir.join(FAILURE_LOG_FILE)
    }
}

impl From<&Config> for CrawlConfig {
    fn from(config: &Config) -> Self {
        Self::from_config(config)
    }
}

/// `<home>/Documents/EXPORT_ARTI`, or a relative `EXPORT_ARTI` without a home directory
pub fn default_export_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("Documents").join("EXPORT_ARTI"),
        None => PathBuf::from("EXPORT_ARTI"),
    }
}
