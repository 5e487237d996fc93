//! Path safety layer
//!
//! Every local path the crawler touches is derived from remote names, so it
//! goes through this module before any filesystem operation:
//! - `sanitize_filename` / `sanitize_path`: platform naming rules
//! - `safe_join`: joins remote names onto a local base directory
//! - `ensure_directory_exists` / `safe_create_file`: idempotent creators
//!
//! The rules themselves live on [`Platform`] so that both rule sets can be
//! exercised on any host; the free functions apply the rules of the host.

mod fs;
mod sanitize;

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub use fs::{ensure_directory_exists, safe_create_file};
pub use sanitize::{Platform, LONG_PATH_PREFIX, MAX_PATH_LENGTH, RESERVED_NAMES};

/// Filesystem errors raised by the path safety layer
#[derive(Debug, Error)]
pub enum PathError {
    #[error("path exists but is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sanitizes a single file or directory name for the host platform
pub fn sanitize_filename(name: &str) -> String {
    Platform::current().sanitize_filename(name)
}

/// Sanitizes a full path for the host platform
///
/// A path that is not valid Unicode is only cleaned lexically, component by
/// component, so its bytes are never rewritten.
pub fn sanitize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.to_str() {
        Some(raw) => PathBuf::from(Platform::current().sanitize_path(raw)),
        None => clean_components(path),
    }
}

/// Joins remote names onto a local base directory
///
/// Each name is sanitized as a single path segment, so a name can never
/// introduce a separator on platforms that forbid it in filenames. The base
/// is treated as an existing local path and only goes through
/// [`sanitize_path`] together with the joined result.
///
/// # Example
///
/// ```
/// use arti_mirror::paths::safe_join;
/// use std::path::Path;
///
/// let joined = safe_join(Path::new("out"), &["org", "junit-4.13.jar"]);
/// assert!(joined.ends_with("junit-4.13.jar"));
/// ```
pub fn safe_join(base: impl AsRef<Path>, names: &[&str]) -> PathBuf {
    let base = base.as_ref();
    let platform = Platform::current();

    let Some(raw) = base.to_str() else {
        let mut joined = base.to_path_buf();
        for name in names {
            let name = platform.sanitize_filename(name);
            if !name.is_empty() {
                joined.push(name);
            }
        }
        return sanitize_path(joined);
    };

    PathBuf::from(platform.safe_join(raw, names))
}

/// Lexical cleaning on path components: drops `.` and resolves `..` where possible
fn clean_components(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component),
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                cleaned.pop();
                depth -= 1;
            }
            Component::ParentDir => {
                if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            Component::Normal(part) => {
                cleaned.push(part);
                depth += 1;
            }
        }
    }

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Converts a slash-separated remote path into a sanitized local path
pub fn url_to_local_path(url_path: &str) -> PathBuf {
    PathBuf::from(Platform::current().url_to_local_path(url_path))
}

/// Converts a `file://` URI (or bare slash path) into a sanitized local path
pub fn uri_to_local_path(uri: &str) -> PathBuf {
    PathBuf::from(Platform::current().uri_to_local_path(uri))
}
