//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: which frontier set a URL is in (to visit, in flight, visited)
//! - `VisitOutcome`: why a URL ended up visited
//! - `FrontierState`: the three disjoint sets and their transitions

mod frontier_state;
mod url_state;

// Re-export main types
pub use frontier_state::{DrawnBatch, FrontierState};
pub use url_state::{UrlState, VisitOutcome};
