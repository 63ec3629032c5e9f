use crate::url::normalize::CanonicalUrl;
use std::path::{Path, PathBuf};

/// Extension used for page files unless configured otherwise
pub const DEFAULT_EXTENSION: &str = "md";

/// Segment used for a URL whose path is empty
pub const INDEX_SEGMENT: &str = "index";

/// Maps a canonical URL to its page file under `base_dir` with the default extension
///
/// # Examples
///
/// ```
/// use docsweep::url::{canonicalize, to_file_path};
/// use std::path::Path;
///
/// let url = canonicalize("https://h").unwrap();
/// assert_eq!(to_file_path(&url, Path::new("base")), Path::new("base/h/index.md"));
///
/// let url = canonicalize("https://h/docs/v5/guide/").unwrap();
/// assert_eq!(
///     to_file_path(&url, Path::new("base")),
///     Path::new("base/h/docs/v5/guide.md")
/// );
/// ```
pub fn to_file_path(url: &CanonicalUrl, base_dir: &Path) -> PathBuf {
    to_file_path_with_extension(url, base_dir, DEFAULT_EXTENSION)
}

/// Maps a canonical URL to `base_dir/<host>/<segment>/.../<last>.<extension>`
///
/// Empty path segments are dropped; a URL with no segments maps to
/// `<host>/index.<extension>`. A non-default port stays part of the host
/// directory (`host:port`). The extension is appended, never substituted, so
/// `/a` and `/a.html` keep distinct files.
pub fn to_file_path_with_extension(url: &CanonicalUrl, base_dir: &Path, extension: &str) -> PathBuf {
    let parsed = url.as_url();

    let host_dir = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let mut segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.is_empty() {
        segments.push(INDEX_SEGMENT);
    }

    let mut path = base_dir.join(host_dir);
    let last = segments.len() - 1;
    for segment in &segments[..last] {
        path.push(segment);
    }
    path.push(format!("{}.{}", segments[last], extension));

    path
}
