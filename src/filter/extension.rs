/// Compound suffix that a last-dot split would reduce to `.gz`
const TAR_GZ: &str = ".tar.gz";

/// Returns the extension of the final path segment of `name`, dot included
///
/// Only the segment after the last `/` is considered, so a directory href
/// such as `org.apache/` has no extension. `.tar.gz` is returned whole.
///
/// # Examples
///
/// ```
/// use arti_mirror::filter::extension_of;
///
/// assert_eq!(extension_of("lib/junit-4.13.jar"), Some(".jar"));
/// assert_eq!(extension_of("dist/app-1.0.tar.gz"), Some(".tar.gz"));
/// assert_eq!(extension_of("org.apache/"), None);
/// assert_eq!(extension_of("LICENSE"), None);
/// ```
pub fn extension_of(name: &str) -> Option<&str> {
    let segment = match name.rfind('/') {
        Some(idx) => &name[idx + 1..],
        None => name,
    };

    if segment.ends_with(TAR_GZ) {
        return Some(&segment[segment.len() - TAR_GZ.len()..]);
    }

    segment.rfind('.').map(|idx| &segment[idx..])
}
