//! Index page line extraction
//!
//! Repository listing pages put one anchor per line, optionally opened by a
//! `<pre>` block:
//!
//! ```text
//! <pre><a href="../">../</a>
//! <a href="org/">org/</a>                           12-Mar-2024 10:02    -
//! <a href="app-1.0.jar">app-1.0.jar</a>             12-Mar-2024 10:02  1.20 KB
//! ```
//!
//! This is a tolerant line matcher, not an HTML parser: lines that do not
//! start with an anchor are ignored and malformed anchors are skipped.

use crate::filter::{classify, EntryKind, FilterSettings};

const ANCHOR_OPEN: &str = "<a href=";
const PRE_ANCHOR_OPEN: &str = "<pre><a href=";
const HREF_OPEN: &str = "href=\"";
const ANCHOR_CLOSE: &str = "</a>";

/// One entry of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Target of the anchor, URL-encoded and relative to the page
    pub href: String,

    /// Visible text of the anchor; directories end with `/`
    pub label: String,
}

impl DirectoryEntry {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }

    /// Decides how the crawler treats this entry
    pub fn classify(&self, settings: &FilterSettings) -> EntryKind {
        classify(&self.href, &self.label, settings)
    }

    /// Label without trailing separators, used as a local directory name
    pub fn directory_name(&self) -> &str {
        self.label.trim_end_matches('/')
    }
}

/// Strips tabs and leading spaces the way listing lines are compared
fn normalize_line(line: &str) -> String {
    line.replace('\t', "").trim_start_matches(' ').to_string()
}

/// Returns true if the line starts with an anchor, directly or inside `<pre>`
pub fn is_anchor_line(line: &str) -> bool {
    let line = normalize_line(line);
    line.starts_with(ANCHOR_OPEN) || line.starts_with(PRE_ANCHOR_OPEN)
}

/// Extracts the entry from one listing line
///
/// Returns `None` for lines that are not anchor lines and for malformed
/// anchors (no quoted href, no closing tag, empty href or label).
///
/// # Examples
///
/// ```
/// use arti_mirror::crawler::parse_listing_line;
///
/// let entry = parse_listing_line(r#"<a href="junit-4.13.jar">junit-4.13.jar</a>   1.2 KB"#).unwrap();
/// assert_eq!(entry.href, "junit-4.13.jar");
/// assert_eq!(entry.label, "junit-4.13.jar");
///
/// assert!(parse_listing_line("<html><body>").is_none());
/// ```
pub fn parse_listing_line(line: &str) -> Option<DirectoryEntry> {
    let line = normalize_line(line);
    if !(line.starts_with(ANCHOR_OPEN) || line.starts_with(PRE_ANCHOR_OPEN)) {
        return None;
    }

    let anchor = &line[line.find("<a ")?..];

    let href_start = anchor.find(HREF_OPEN)? + HREF_OPEN.len();
    let href_end = href_start + anchor[href_start..].find('"')?;
    let href = &anchor[href_start..href_end];

    let after_href = href_end + 1;
    let label_start = after_href + anchor[after_href..].find('>')? + 1;
    let label_end = label_start + anchor[label_start..].find(ANCHOR_CLOSE)?;
    let label = &anchor[label_start..label_end];

    if href.is_empty() || label.is_empty() {
        return None;
    }

    Some(DirectoryEntry::new(href, label))
}

/// Extracts every well-formed entry from a listing page
pub fn parse_listing(content: &str) -> Vec<DirectoryEntry> {
    content.lines().filter_map(parse_listing_line).collect()
}
