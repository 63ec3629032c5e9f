use crate::{UrlError, UrlResult};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// Stable identity key of a page
///
/// Two raw URLs that differ only in query string, fragment, or trailing
/// slashes produce equal `CanonicalUrl`s. Equality, ordering and hashing use
/// the string key alone; the parsed form is kept alongside so path mapping
/// never has to re-parse.
#[derive(Debug, Clone)]
pub struct CanonicalUrl {
    key: String,
    url: Url,
}

impl CanonicalUrl {
    /// Returns the canonical key
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns the parsed URL (query and fragment already removed)
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for CanonicalUrl {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalUrl {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.key
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Canonicalizes a URL into its identity key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove the query string
/// 3. Remove the fragment
/// 4. Remove trailing slashes from the path (the root path included)
///
/// Host lowercasing, default-port removal and dot-segment resolution come
/// from URL parsing itself. Every trailing slash is stripped, not just one,
/// which keeps the function idempotent for paths like `/a//`.
///
/// # Examples
///
/// ```
/// use docsweep::url::canonicalize;
///
/// let url = canonicalize("https://h/a/b/?x=1#y").unwrap();
/// assert_eq!(url.as_str(), "https://h/a/b");
/// assert_eq!(canonicalize(url.as_str()).unwrap(), url);
/// ```
pub fn canonicalize(raw: &str) -> UrlResult<CanonicalUrl> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_parsed(&mut url)?;

    let key = url.as_str().trim_end_matches('/').to_string();
    Ok(CanonicalUrl { key, url })
}

/// Applies the canonicalization rules to an already-parsed URL in place
fn canonicalize_parsed(url: &mut Url) -> UrlResult<()> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_query(None);
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    Ok(())
}
