//! Configuration module for Arti-Mirror
//!
//! This module handles loading, parsing, and validating the TOML
//! configuration file, resolving the repository list, and deriving the
//! immutable [`CrawlConfig`] the crawler runs with.
//!
//! # Example
//!
//! ```no_run
//! use arti_mirror::config::{load_config, CrawlConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("refap.toml")).unwrap();
//! let crawl = CrawlConfig::from_config(&config);
//! println!("Mirroring {} into {}", crawl.base_url, crawl.output_dir.display());
//! ```

mod crawl;
mod parser;
mod repo_list;
mod types;
mod validation;

// Re-export types
pub use crawl::{default_export_dir, AuthMethod, CrawlConfig, ProxySettings, FAILURE_LOG_FILE};
pub use types::{
    ArtifactoryConfig, AuthConfig, AuthType, Config, DownloadConfig, FilesConfig, GeneralConfig,
    ProxyConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use repo_list::{
    load_repository_list, parse_repository_list, repo_list_path, resolve_repositories,
};
pub use validation::validate;
