//! Lifecycle states of a canonical URL during one crawl run
//!
//! A URL only ever moves forward: `ToVisit -> InFlight -> Visited`, or
//! straight from `ToVisit` to `Visited` when its file already exists.

use std::fmt;

/// Which of the three frontier sets a URL currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Discovered, not yet dispatched
    ToVisit,

    /// Dispatched to the fetcher, outcome pending
    InFlight,

    /// Terminal: fetched, failed, or already captured on disk
    Visited,
}

impl UrlState {
    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::ToVisit, Self::InFlight)
                | (Self::ToVisit, Self::Visited)
                | (Self::InFlight, Self::Visited)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToVisit => "to_visit",
            Self::InFlight => "in_flight",
            Self::Visited => "visited",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a URL reached the visited set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitOutcome {
    /// Fetched successfully (whether or not the write succeeded)
    Fetched,

    /// Fetch failed; not retried in this run
    FetchFailed,

    /// Target file already existed, no fetch issued
    AlreadyCaptured,

    /// Dispatched but the fetcher returned no result for it
    NoResult,
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetched => "fetched",
            Self::FetchFailed => "fetch_failed",
            Self::AlreadyCaptured => "already_captured",
            Self::NoResult => "no_result",
        };
        f.write_str(s)
    }
}
