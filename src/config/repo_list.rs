//! Repository list resolution
//!
//! Repositories come either inline from the configuration or from a plain
//! text file with one repository path per line.

use crate::config::types::Config;
use crate::paths::{safe_join, sanitize_path};
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Returns the repositories to mirror
///
/// Inline `repositories` take priority over the `repo_list` file. A relative
/// `repo_list` path is resolved against the output directory.
///
/// # Errors
///
/// * `ConfigError::RepoList` - The list file cannot be read or holds no repository
pub fn resolve_repositories(config: &Config) -> Result<Vec<String>, ConfigError> {
    let inline: Vec<String> = config
        .artifactory
        .repositories
        .iter()
        .map(|repo| repo.trim().to_string())
        .filter(|repo| !repo.is_empty())
        .collect();
    if !inline.is_empty() {
        return Ok(inline);
    }

    let path = repo_list_path(config);
    load_repository_list(&path)
}

/// Location of the repository list file for this configuration
pub fn repo_list_path(config: &Config) -> PathBuf {
    let repo_list = Path::new(config.artifactory.repo_list.trim());
    if repo_list.is_absolute() {
        sanitize_path(repo_list)
    } else {
        safe_join(&config.general.output_dir, &[config.artifactory.repo_list.trim()])
    }
}

/// Reads a repository list file
pub fn load_repository_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RepoList {
        path: path.to_path_buf(),
        message: format!("failed to open repo list file: {}", e),
    })?;

    let repos = parse_repository_list(&content);
    if repos.is_empty() {
        return Err(ConfigError::RepoList {
            path: path.to_path_buf(),
            message: "no repositories found in repo list file".to_string(),
        });
    }

    Ok(repos)
}

/// Splits list content into trimmed, non-blank repository paths
pub fn parse_repository_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.replace('\r', ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
