//! URL handling module for Docsweep
//!
//! This module provides the canonicalizer: identity keys for pages, link
//! resolution, the scope filter, and the mapping from a canonical URL to the
//! file its content is stored in.

mod normalize;
mod path;
mod resolve;
mod scope;

// Re-export main functions
pub use normalize::{canonicalize, CanonicalUrl};
pub use path::{to_file_path, to_file_path_with_extension, DEFAULT_EXTENSION, INDEX_SEGMENT};
pub use resolve::resolve;
pub use scope::ScopeFilter;
