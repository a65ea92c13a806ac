//! List state for takeEvery refreshes
//!
//! Every refresh runs to completion and writes its result, so the state only
//! counts how many are still in flight.

use chrono::{DateTime, Utc};

use crate::load::LoadFailure;

/// State of a refreshable list
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    in_flight: usize,
    items: Vec<T>,
    failure: Option<LoadFailure>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            in_flight: 0,
            items: Vec::new(),
            failure: None,
            refreshed_at: None,
        }
    }
}

impl<T> ListState<T> {
    pub(crate) fn started(&mut self) {
        self.in_flight += 1;
    }

    /// Record a finished refresh. A failure keeps the previous items.
    pub(crate) fn finished(&mut self, result: Result<Vec<T>, LoadFailure>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(items) => {
                self.items = items;
                self.failure = None;
                self.refreshed_at = Some(Utc::now());
            }
            Err(failure) => self.failure = Some(failure),
        }
    }

    /// Release a refresh that ended without a result
    pub(crate) fn abandoned(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
