use crate::filter::{FilterMode, DEFAULT_FILE_TYPES};
use serde::Deserialize;
use std::fmt;

/// Main configuration structure, as read from the TOML file
///
/// Every section may be omitted; validation reports the values that are
/// actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub artifactory: ArtifactoryConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Output locations and logging
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Root of the local mirror
    pub output_dir: String,

    /// Default log level for this crate
    pub log_level: String,

    /// Accepted for compatibility; downloads run one at a time
    pub concurrent_downloads: u32,

    /// Directory holding `failed_download.txt`
    /// (defaults to `<home>/Documents/EXPORT_ARTI`)
    pub export_dir: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: "./downloads".to_string(),
            log_level: "info".to_string(),
            concurrent_downloads: 4,
            export_dir: None,
        }
    }
}

/// Remote repository manager settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactoryConfig {
    /// Listing base URL, e.g. `https://repo.example.com/artifactory/list/`
    pub url: String,

    /// File with one repository path per line, used when `repositories` is empty
    pub repo_list: String,

    /// Inline repository paths
    pub repositories: Vec<String>,

    /// Comma-separated suffixes used by the `none` filter mode
    pub file_types: String,

    /// Re-download files that already exist locally
    pub force_replace: bool,
}

impl Default for ArtifactoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            repo_list: "liste_arti.csv".to_string(),
            repositories: Vec::new(),
            file_types: DEFAULT_FILE_TYPES.to_string(),
            force_replace: false,
        }
    }
}

/// Inclusion filter and index-page handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub filter_mode: FilterMode,
    pub extensions: Vec<String>,
    pub include_maven_metadata: bool,

    /// Delete transient index pages at the end of the run
    pub clean_html_files: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::None,
            extensions: Vec::new(),
            include_maven_metadata: true,
            clean_html_files: true,
        }
    }
}

/// Download behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Attempts per file, first attempt included
    pub retry_attempts: u32,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Pause between retries and after every file, in seconds
    pub delay: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            timeout: 10,
            delay: 1,
        }
    }
}

/// HTTP proxy settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u32,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Supported authentication schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Token,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::Basic => "basic",
            AuthType::Token => "token",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub kind: AuthType,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
}
