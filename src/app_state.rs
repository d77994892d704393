//! Implements a struct that holds the state of the tracker web server.

use crate::{api::TransactionsApi, tracker::Tracker};

/// The state of the tracker web server.
///
/// Every request shares the same [Tracker], so the page behaves like a single
/// long-lived view over the Transactions API.
#[derive(Debug)]
pub struct AppState<A> {
    /// The tracker store that the page renders.
    pub tracker: Tracker<A>,
}

impl<A: TransactionsApi> AppState<A> {
    /// Create a new [AppState] whose tracker talks to `api`.
    pub fn new(api: A) -> Self {
        Self {
            tracker: Tracker::new(api),
        }
    }
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
        }
    }
}
