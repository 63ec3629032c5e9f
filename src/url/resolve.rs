use crate::url::normalize::{canonicalize, CanonicalUrl};
use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a crawlable page
const UNCRAWLABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a link found on a page and canonicalizes the result
///
/// Handles absolute (`https://h/x`), root-relative (`/x`) and relative
/// (`x`, `../x`) hrefs. Relative hrefs resolve against `base`, which should be
/// the URL the page was actually served from.
///
/// # Examples
///
/// ```
/// use docsweep::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://h/docs/a").unwrap();
/// assert_eq!(resolve(&base, "b").unwrap().as_str(), "https://h/docs/b");
/// assert_eq!(resolve(&base, "/other/").unwrap().as_str(), "https://h/other");
/// ```
pub fn resolve(base: &Url, href: &str) -> UrlResult<CanonicalUrl> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::UnusableLink("empty href".to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if UNCRAWLABLE_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return Err(UrlError::UnusableLink(href.to_string()));
    }

    let joined = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    canonicalize(joined.as_str())
}
