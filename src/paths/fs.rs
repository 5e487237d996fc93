//! Idempotent filesystem creators built on the sanitizing rules

use super::{sanitize_path, PathError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirBuilder, File};

/// Ensures that `path` exists as a directory, creating it and its ancestors
///
/// Returns the sanitized path that was checked or created. Calling this
/// repeatedly with the same input is harmless.
///
/// # Errors
///
/// * `PathError::NotADirectory` - Something other than a directory exists at the path
/// * `PathError::Io` - The path could not be inspected or created
pub async fn ensure_directory_exists(path: impl AsRef<Path>) -> Result<PathBuf, PathError> {
    let path = sanitize_path(path);

    match fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => Ok(path),
        Ok(_) => Err(PathError::NotADirectory { path }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(0o755);

            builder
                .create(&path)
                .await
                .map_err(|source| PathError::Io {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!("Created directory {}", path.display());
            Ok(path)
        }
        Err(source) => Err(PathError::Io { path, source }),
    }
}

/// Creates (or truncates) a file, creating its parent directory first
pub async fn safe_create_file(path: impl AsRef<Path>) -> Result<File, PathError> {
    let path = sanitize_path(path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory_exists(parent).await?;
    }

    File::create(&path)
        .await
        .map_err(|source| PathError::Io { path, source })
}
