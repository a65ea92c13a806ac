//! Representatives loader
//!
//! List refresh with takeEvery semantics: each `refresh()` runs to
//! completion independently and writes its own result. There is no notion
//! of staleness for this list.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::LoadFailure;
use crate::api::{ExplorerApi, Representative};
use crate::state::ListState;

pub struct RepresentativesLoader {
    api: Arc<dyn ExplorerApi>,
    tx: Arc<watch::Sender<ListState<Representative>>>,
}

impl RepresentativesLoader {
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        let (tx, _) = watch::channel(ListState::default());
        Self {
            api,
            tx: Arc::new(tx),
        }
    }

    /// Fetch the representatives list.
    ///
    /// Resolves to the number of representatives received.
    pub fn refresh(&self) -> JoinHandle<Result<usize, LoadFailure>> {
        let guard = InFlight::start(Arc::clone(&self.tx));

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = api
                .fetch_representatives()
                .await
                .map_err(LoadFailure::from);

            let outcome = match &result {
                Ok(reps) => {
                    tracing::info!(count = reps.len(), "Representatives refreshed");
                    Ok(reps.len())
                }
                Err(failure) => {
                    tracing::warn!(error = %failure, "Representatives refresh failed");
                    Err(failure.clone())
                }
            };

            guard.finish(result);
            outcome
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<Representative>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ListState<Representative> {
        self.tx.borrow().clone()
    }
}

/// One counted refresh. Dropped without `finish` (panic, abort), it still
/// releases its in-flight slot.
struct InFlight {
    tx: Arc<watch::Sender<ListState<Representative>>>,
    done: bool,
}

impl InFlight {
    fn start(tx: Arc<watch::Sender<ListState<Representative>>>) -> Self {
        tx.send_modify(|state| state.started());
        Self { tx, done: false }
    }

    fn finish(mut self, result: Result<Vec<Representative>, LoadFailure>) {
        self.done = true;
        self.tx.send_modify(|state| state.finished(result));
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            tracing::debug!("Representatives refresh abandoned");
            self.tx.send_modify(|state| state.abandoned());
        }
    }
}
