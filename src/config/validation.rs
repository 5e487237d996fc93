use crate::config::types::{
    ArtifactoryConfig, AuthConfig, AuthType, Config, DownloadConfig, FilesConfig, GeneralConfig,
    ProxyConfig,
};
use crate::filter::FilterMode;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_general_config(&config.general)?;
    validate_artifactory_config(&config.artifactory)?;
    validate_files_config(&config.files);
    validate_download_config(&config.download)?;
    validate_proxy_config(&config.proxy)?;
    validate_auth_config(&config.auth)?;
    Ok(())
}

fn validate_general_config(config: &GeneralConfig) -> Result<(), ConfigError> {
    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.concurrent_downloads < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrent_downloads must be >= 1, got {}",
            config.concurrent_downloads
        )));
    }

    Ok(())
}

/// Validates the repository manager URL and repository sources
fn validate_artifactory_config(config: &ArtifactoryConfig) -> Result<(), ConfigError> {
    if config.url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "artifactory URL cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(config.url.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid artifactory url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "artifactory url '{}' must use http or https",
            config.url
        )));
    }

    if config.repositories.is_empty() && config.repo_list.trim().is_empty() {
        return Err(ConfigError::Validation(
            "either 'repositories' or 'repo_list' must be specified in the configuration"
                .to_string(),
        ));
    }

    Ok(())
}

/// Filter settings cannot be invalid once parsed, but some are suspicious
fn validate_files_config(config: &FilesConfig) {
    if config.filter_mode != FilterMode::None && config.extensions.is_empty() {
        tracing::warn!(
            "filter_mode is '{}' but no extensions are configured",
            config.filter_mode
        );
    }
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "proxy host cannot be empty when proxy is enabled".to_string(),
        ));
    }

    if config.port == 0 || config.port > 65535 {
        return Err(ConfigError::Validation(format!(
            "proxy port must be between 1 and 65535, got {}",
            config.port
        )));
    }

    Ok(())
}

fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    let is_blank = |value: &Option<String>| value.as_deref().map_or(true, str::is_empty);

    match config.kind {
        AuthType::None => Ok(()),
        AuthType::Basic if is_blank(&config.username) => Err(ConfigError::Validation(
            "username cannot be empty for basic authentication".to_string(),
        )),
        AuthType::Basic if is_blank(&config.password) => Err(ConfigError::Validation(
            "password cannot be empty for basic authentication".to_string(),
        )),
        AuthType::Basic => Ok(()),
        AuthType::Token if is_blank(&config.access_token) => Err(ConfigError::Validation(
            "access token cannot be empty for token authentication".to_string(),
        )),
        AuthType::Token => Ok(()),
    }
}
