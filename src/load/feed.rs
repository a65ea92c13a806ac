//! Post feed loader
//!
//! Each feed has its own `FeedState` channel. Loads are latest-wins per
//! feed: switching the age window supersedes the previous load of that feed
//! and leaves other feeds alone.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::error::LoadFailure;
use crate::api::{ExplorerApi, FeedId, Filters};
use crate::state::FeedState;

pub struct FeedLoader {
    api: Arc<dyn ExplorerApi>,
    feeds: RwLock<HashMap<FeedId, Arc<watch::Sender<FeedState>>>>,
}

impl FeedLoader {
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self {
            api,
            feeds: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, feed: &FeedId) -> Arc<watch::Sender<FeedState>> {
        if let Some(tx) = self.feeds.read().await.get(feed) {
            return Arc::clone(tx);
        }

        let mut feeds = self.feeds.write().await;
        let tx = feeds.entry(feed.clone()).or_insert_with(|| {
            let (tx, _) = watch::channel(FeedState::new(feed.clone()));
            Arc::new(tx)
        });
        Arc::clone(tx)
    }

    /// Load `feed` with `filters`, superseding any earlier load of it.
    ///
    /// Resolves to `true` if this load's result was applied.
    pub async fn load(&self, feed: FeedId, filters: Filters) -> JoinHandle<bool> {
        let tx = self.slot(&feed).await;

        let mut generation = 0;
        tx.send_modify(|state| generation = state.begin(filters.clone()));

        tracing::debug!(feed = %feed, generation, age = ?filters.age, "Loading posts");

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = match api.fetch_posts(&feed, &filters).await {
                Ok(posts) => Ok(posts),
                Err(e) if e.is_not_found() => Ok(Vec::new()),
                Err(e) => {
                    tracing::warn!(feed = %feed, error = %e, "Posts fetch failed");
                    Err(LoadFailure::from(e))
                }
            };

            let applied = tx.send_if_modified(|state| state.complete(generation, result));
            if !applied {
                tracing::debug!(feed = %feed, generation, "Stale posts result, discarding");
            }
            applied
        })
    }

    pub async fn subscribe(&self, feed: &FeedId) -> watch::Receiver<FeedState> {
        self.slot(feed).await.subscribe()
    }

    pub async fn snapshot(&self, feed: &FeedId) -> FeedState {
        self.slot(feed).await.borrow().clone()
    }
}
