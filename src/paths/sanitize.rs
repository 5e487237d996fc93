/// Longest path accepted by the restrictive platform without a prefix
pub const MAX_PATH_LENGTH: usize = 259;

/// Extended-length marker for paths longer than [`MAX_PATH_LENGTH`]
pub const LONG_PATH_PREFIX: &str = r"\\?\";

/// Device names that cannot be used as a file stem on the restrictive platform
pub const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Filename rule set applied to local paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Restrictive rules: forbidden characters, reserved device names,
    /// path-length ceiling, `\` separator
    Windows,

    /// Permissive rules: whitespace trim and lexical cleaning only
    Unix,
}

impl Platform {
    /// Returns the rule set of the host the crate was compiled for
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Path separator used when joining segments
    pub const fn separator(self) -> char {
        match self {
            Self::Windows => '\\',
            Self::Unix => '/',
        }
    }

    /// Returns true if this platform restricts filename characters
    pub const fn is_restrictive(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Sanitizes a single path segment
    ///
    /// Surrounding whitespace is always trimmed. On the restrictive platform
    /// forbidden characters become `_`, and a stem matching a reserved device
    /// name (case-insensitive) gets a `_` appended before its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use arti_mirror::paths::Platform;
    ///
    /// assert_eq!(Platform::Windows.sanitize_filename("CON.txt"), "CON_.txt");
    /// assert_eq!(Platform::Windows.sanitize_filename("a:b?.jar"), "a_b_.jar");
    /// assert_eq!(Platform::Unix.sanitize_filename(" CON.txt "), "CON.txt");
    /// ```
    pub fn sanitize_filename(self, name: &str) -> String {
        let name = name.trim();

        if !self.is_restrictive() {
            return name.to_string();
        }

        let replaced: String = name
            .chars()
            .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
            .collect();

        let (stem, ext) = split_extension(&replaced);
        if RESERVED_NAMES
            .iter()
            .any(|reserved| stem.eq_ignore_ascii_case(reserved))
        {
            return format!("{stem}_{ext}");
        }

        replaced
    }

    /// Sanitizes a full path
    ///
    /// On the restrictive platform every segment except the leading
    /// drive/root marker is sanitized, separators are normalized to `\`, and
    /// the extended-length prefix is added once the result exceeds
    /// [`MAX_PATH_LENGTH`]. On the permissive platform the path is cleaned
    /// lexically (`//`, `.` and resolvable `..` segments are removed).
    pub fn sanitize_path(self, path: &str) -> String {
        match self {
            Self::Unix => clean_unix(path),
            Self::Windows => {
                let (had_prefix, rest) = match path.strip_prefix(LONG_PATH_PREFIX) {
                    Some(rest) => (true, rest),
                    None => (false, path),
                };

                let normalized = rest.replace('/', "\\");
                let result = normalized
                    .split('\\')
                    .enumerate()
                    .map(|(i, part)| {
                        if i == 0 || part.is_empty() {
                            part.to_string()
                        } else {
                            self.sanitize_filename(part)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\\");

                if had_prefix || result.len() > MAX_PATH_LENGTH {
                    format!("{LONG_PATH_PREFIX}{result}")
                } else {
                    result
                }
            }
        }
    }

    /// Joins sanitized names onto `base` and sanitizes the result
    pub fn safe_join(self, base: &str, names: &[&str]) -> String {
        let sep = self.separator();
        let mut joined = base.to_string();

        for name in names {
            let name = self.sanitize_filename(name);
            if name.is_empty() {
                continue;
            }
            if !joined.is_empty() && !joined.ends_with(sep) && !joined.ends_with('/') {
                joined.push(sep);
            }
            joined.push_str(&name);
        }

        self.sanitize_path(&joined)
    }

    /// Converts a slash-separated remote path into a local path
    pub fn url_to_local_path(self, url_path: &str) -> String {
        let local: String = url_path
            .chars()
            .map(|c| if c == '/' { self.separator() } else { c })
            .collect();
        self.sanitize_path(&local)
    }

    /// Converts a URI with an optional `file://` scheme into a local path
    pub fn uri_to_local_path(self, uri: &str) -> String {
        self.url_to_local_path(uri.strip_prefix("file://").unwrap_or(uri))
    }
}

/// Splits a filename at its last dot; the extension keeps the dot
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Lexical path cleaning for slash-separated paths
fn clean_unix(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
