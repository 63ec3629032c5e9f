use crate::url::normalize::CanonicalUrl;
use crate::ConfigError;
use regex::Regex;

/// Pattern deciding which discovered links may enter the frontier
///
/// The pattern is a regular expression searched anywhere in the canonical
/// URL, so a plain substring such as `/docs/` works as well as an anchored
/// expression.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    pattern: Regex,
}

impl ScopeFilter {
    /// Compiles a scope pattern
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    /// Returns true if the canonical URL is in scope
    pub fn matches(&self, url: &CanonicalUrl) -> bool {
        self.matches_str(url.as_str())
    }

    /// Returns true if the URL string is in scope
    pub fn matches_str(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// Returns the source pattern
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
