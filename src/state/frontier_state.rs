//! The three disjoint URL sets driving a crawl
//!
//! `FrontierState` is owned by a single control task and mutated only between
//! batch dispatches, so it needs no locking. Every mutation keeps the sets
//! disjoint and never moves a URL out of `visited`.

use crate::state::url_state::UrlState;
use crate::url::CanonicalUrl;
use std::collections::HashSet;

/// A batch drawn from `to_visit`
#[derive(Debug, Default)]
pub struct DrawnBatch {
    /// URLs moved to `in_flight`, to be handed to the fetcher
    pub dispatch: Vec<CanonicalUrl>,

    /// URLs moved straight to `visited` because they were already captured
    pub skipped: Vec<CanonicalUrl>,
}

/// Crawl state: `to_visit`, `in_flight` and `visited`
#[derive(Debug, Default)]
pub struct FrontierState {
    to_visit: HashSet<CanonicalUrl>,
    in_flight: HashSet<CanonicalUrl>,
    visited: HashSet<CanonicalUrl>,
}

impl FrontierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns which set the URL is in, if any
    pub fn state_of(&self, url: &str) -> Option<UrlState> {
        if self.visited.contains(url) {
            Some(UrlState::Visited)
        } else if self.in_flight.contains(url) {
            Some(UrlState::InFlight)
        } else if self.to_visit.contains(url) {
            Some(UrlState::ToVisit)
        } else {
            None
        }
    }

    /// Returns true if the URL is in any of the three sets
    pub fn is_known(&self, url: &str) -> bool {
        self.state_of(url).is_some()
    }

    /// Adds a URL to `to_visit` unless it is already known
    ///
    /// Returns true if the URL was newly queued.
    pub fn enqueue(&mut self, url: CanonicalUrl) -> bool {
        if self.is_known(url.as_str()) {
            return false;
        }
        tracing::trace!("{} -> {}", url, UrlState::ToVisit);
        self.to_visit.insert(url)
    }

    /// Draws up to `capacity` URLs from `to_visit`, taking at most `budget` in total
    ///
    /// URLs for which `already_captured` returns true go straight to
    /// `visited` and do not count against `capacity`, but they do count
    /// against `budget`; the rest move to `in_flight`. Selection order is
    /// whatever the set yields: there is no priority and callers must not
    /// rely on any traversal order.
    pub fn draw_batch<F>(&mut self, capacity: usize, budget: usize, mut already_captured: F) -> DrawnBatch
    where
        F: FnMut(&CanonicalUrl) -> bool,
    {
        let mut batch = DrawnBatch::default();

        while batch.dispatch.len() < capacity && batch.dispatch.len() + batch.skipped.len() < budget {
            let next = match self.to_visit.iter().next() {
                Some(url) => url.clone(),
                None => break,
            };
            self.to_visit.remove(next.as_str());

            if already_captured(&next) {
                trace_transition(&next, UrlState::ToVisit, UrlState::Visited);
                self.visited.insert(next.clone());
                batch.skipped.push(next);
            } else {
                trace_transition(&next, UrlState::ToVisit, UrlState::InFlight);
                self.in_flight.insert(next.clone());
                batch.dispatch.push(next);
            }
        }

        batch
    }

    /// Moves an in-flight URL to `visited`
    ///
    /// Returns false (and changes nothing) if the URL was not in flight.
    pub fn complete(&mut self, url: &str) -> bool {
        match self.in_flight.take(url) {
            Some(url) => {
                trace_transition(&url, UrlState::InFlight, UrlState::Visited);
                self.visited.insert(url);
                true
            }
            None => false,
        }
    }

    /// Moves every remaining in-flight URL to `visited` and returns them
    pub fn complete_all_in_flight(&mut self) -> Vec<CanonicalUrl> {
        let drained: Vec<CanonicalUrl> = self.in_flight.drain().collect();
        for url in &drained {
            trace_transition(url, UrlState::InFlight, UrlState::Visited);
            self.visited.insert(url.clone());
        }
        drained
    }

    pub fn to_visit_len(&self) -> usize {
        self.to_visit.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns true when nothing is queued and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.to_visit.is_empty() && self.in_flight.is_empty()
    }

    /// Returns true if no URL belongs to more than one set
    pub fn is_consistent(&self) -> bool {
        self.to_visit.is_disjoint(&self.in_flight)
            && self.to_visit.is_disjoint(&self.visited)
            && self.in_flight.is_disjoint(&self.visited)
    }
}

fn trace_transition(url: &CanonicalUrl, from: UrlState, to: UrlState) {
    debug_assert!(from.can_transition_to(to), "{}: {} -> {}", url, from, to);
    tracing::trace!("{} -> {}", url, to);
}
