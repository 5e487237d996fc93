//! Inclusion filter and entry classification
//!
//! Index pages do not tag entries as files or directories. The crawler
//! decides with the same inclusion rule it uses for downloads: an entry the
//! filter accepts is a file, anything else is assumed to be a navigable
//! directory. [`classify`] makes that inference explicit.

mod extension;

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub use extension::extension_of;

/// Name of the Maven metadata file that can bypass the extension rules
pub const MAVEN_METADATA_FILE: &str = "maven-metadata.xml";

/// Legacy extension list used when no filter mode is selected
pub const DEFAULT_FILE_TYPES: &str = ".pom,.jar,.war,.xml,.zip,.tar,.tar.gz";

/// Sequence that marks an entry label as a parent-directory reference
pub const PARENT_REFERENCE: &str = "..";

/// How the configured extension list is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Match against the legacy comma-separated file type list
    #[default]
    None,
    /// Only listed extensions are included
    Whitelist,
    /// Everything except listed extensions is included
    Blacklist,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Whitelist => "whitelist",
            Self::Blacklist => "blacklist",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "whitelist" => Ok(Self::Whitelist),
            "blacklist" => Ok(Self::Blacklist),
            other => Err(format!(
                "invalid filter mode '{}', must be one of: none, whitelist, blacklist",
                other
            )),
        }
    }
}

/// Inclusion filter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    pub mode: FilterMode,

    /// Extensions used by whitelist and blacklist modes
    pub extensions: Vec<String>,

    /// Suffixes used by [`FilterMode::None`]
    pub legacy_extensions: Vec<String>,

    /// Include `maven-metadata.xml` regardless of mode
    pub include_maven_metadata: bool,
}

impl FilterSettings {
    /// Builds settings, dropping blank entries from both lists
    ///
    /// A blank suffix would match every name.
    pub fn new(
        mode: FilterMode,
        extensions: &[String],
        legacy_file_types: &str,
        include_maven_metadata: bool,
    ) -> Self {
        Self {
            mode,
            extensions: clean_list(extensions.iter().map(String::as_str)),
            legacy_extensions: clean_list(legacy_file_types.split(',')),
            include_maven_metadata,
        }
    }

    /// Convenience constructor for whitelist mode
    pub fn whitelist(extensions: &[&str]) -> Self {
        Self::with_mode(FilterMode::Whitelist, extensions)
    }

    /// Convenience constructor for blacklist mode
    pub fn blacklist(extensions: &[&str]) -> Self {
        Self::with_mode(FilterMode::Blacklist, extensions)
    }

    fn with_mode(mode: FilterMode, extensions: &[&str]) -> Self {
        Self {
            mode,
            extensions: clean_list(extensions.iter().copied()),
            legacy_extensions: clean_list(DEFAULT_FILE_TYPES.split(',')),
            include_maven_metadata: false,
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::new(FilterMode::None, &[], DEFAULT_FILE_TYPES, true)
    }
}

fn clean_list<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decides whether an entry name is a downloadable file of interest
///
/// # Rules
///
/// 1. `maven-metadata.xml` is included when the override is enabled
/// 2. A name without extension is included unless the mode is whitelist
/// 3. `none`: included iff the name ends with a legacy suffix
/// 4. `whitelist`: included iff the extension equals, or the name ends
///    with, a listed extension
/// 5. `blacklist`: the inverse of whitelist
///
/// # Examples
///
/// ```
/// use arti_mirror::filter::{should_include, FilterSettings};
///
/// let settings = FilterSettings::whitelist(&[".jar", ".pom"]);
/// assert!(should_include("junit-4.13.jar", &settings));
/// assert!(!should_include("junit-4.13-sources.zip", &settings));
/// ```
pub fn should_include(name: &str, settings: &FilterSettings) -> bool {
    if settings.include_maven_metadata && name.ends_with(MAVEN_METADATA_FILE) {
        return true;
    }

    let Some(ext) = extension_of(name) else {
        return settings.mode != FilterMode::Whitelist;
    };

    let listed = || {
        settings
            .extensions
            .iter()
            .any(|candidate| ext == candidate.as_str() || name.ends_with(candidate.as_str()))
    };

    match settings.mode {
        FilterMode::None => settings
            .legacy_extensions
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str())),
        FilterMode::Whitelist => listed(),
        FilterMode::Blacklist => !listed(),
    }
}

/// Why an entry was neither downloaded nor traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The label contains a parent reference and would escape the output tree
    ParentReference,
    /// The filter accepted the href but the label looks like a directory
    DirectoryLabel,
}

/// How the crawler treats one listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Download the entry as a file
    File,
    /// Descend into the entry as a subdirectory
    Directory,
    /// Leave the entry alone
    Skip(SkipReason),
}

/// Classifies a listing entry from its href and visible label
///
/// The filter runs on `href`; the label decides between the file branch and
/// the skip branches. Anything the filter rejects is treated as a directory
/// unless its label contains a parent reference.
pub fn classify(href: &str, label: &str, settings: &FilterSettings) -> EntryKind {
    if should_include(href, settings) {
        if !label.ends_with('/') {
            EntryKind::File
        } else if label.contains(PARENT_REFERENCE) {
            EntryKind::Skip(SkipReason::ParentReference)
        } else {
            EntryKind::Skip(SkipReason::DirectoryLabel)
        }
    } else if label.contains(PARENT_REFERENCE) {
        EntryKind::Skip(SkipReason::ParentReference)
    } else {
        EntryKind::Directory
    }
}
