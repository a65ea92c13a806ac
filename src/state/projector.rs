//! Load-state projector
//!
//! Owns the authoritative `TaskSet` of a page and publishes a fresh
//! `PageState` to every subscriber after each accepted transition. The task
//! set is written only here, under one lock; readers only ever see
//! snapshots through the watch channel.

use tokio::sync::{watch, RwLock};

use super::page::PageState;
use crate::load::{LoadRequest, LoadResult, TaskEvent, TaskSet};

/// Single writer of a page's task set
pub struct Projector {
    tasks: RwLock<TaskSet>,
    tx: watch::Sender<PageState>,
}

impl Projector {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PageState::default());
        Self {
            tasks: RwLock::new(TaskSet::new()),
            tx,
        }
    }

    /// Make `request` authoritative and return its generation
    pub async fn begin(&self, request: LoadRequest) -> u64 {
        let mut tasks = self.tasks.write().await;
        let generation = tasks.begin(request);
        self.tx.send_replace(PageState::project(&tasks));
        generation
    }

    /// Apply a task transition and publish the new state.
    ///
    /// Rejected events leave the published state untouched.
    pub async fn apply(&self, event: TaskEvent) -> LoadResult<()> {
        let mut tasks = self.tasks.write().await;
        tasks.apply(event)?;
        self.tx.send_replace(PageState::project(&tasks));
        Ok(())
    }

    /// Apply several transitions as one.
    ///
    /// Either every event is accepted and a single snapshot is published,
    /// or the first rejection is returned and nothing changes.
    pub async fn apply_all(&self, events: Vec<TaskEvent>) -> LoadResult<()> {
        let mut tasks = self.tasks.write().await;
        let mut next = tasks.clone();
        for event in events {
            next.apply(event)?;
        }
        *tasks = next;
        self.tx.send_replace(PageState::project(&tasks));
        Ok(())
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PageState {
        self.tx.borrow().clone()
    }

    pub async fn generation(&self) -> u64 {
        self.tasks.read().await.generation()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}
