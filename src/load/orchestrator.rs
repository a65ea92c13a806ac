//! Account page loader
//!
//! Runs the load sequence of the account page with latest-wins semantics:
//!
//! ```text
//! submit ─► primary (account) ──ok──► detail (open)        ┐
//!                │                    summary: send        ├ concurrent
//!                │                    summary: receive     │
//!                │                    summary: change      ┘
//!                └─err──► terminal failure, nothing else issued
//! ```
//!
//! Each submission begins a new generation in the projector. Completions
//! of an older generation are rejected by the reducer and dropped here.

use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

use super::error::LoadFailure;
use super::request::LoadRequest;
use super::task::{TaskEvent, TaskKind, TaskOutcome, TaskPayload};
use crate::api::{Account, AccountId, AccountOpen, BlockType, BlocksSummary, ExplorerApi};
use crate::state::Projector;

/// Configuration for the account loader
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Categories fetched as auxiliary summaries
    pub auxiliary: Vec<BlockType>,
    /// Abort the superseded sequence instead of letting it run out
    pub abort_on_supersede: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            auxiliary: BlockType::ALL.to_vec(),
            abort_on_supersede: false,
        }
    }
}

/// How a load sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Primary succeeded and every fork reported back
    Completed,
    /// Primary failed; no further calls were issued
    PrimaryFailed,
    /// A newer request took over before the sequence finished
    Superseded,
    /// The sequence task was aborted
    Aborted,
    /// The reducer refused one of the sequence's own events
    Rejected,
}

/// Handle to a submitted load sequence
pub struct LoadHandle {
    generation: u64,
    request_id: Uuid,
    join: JoinHandle<SequenceOutcome>,
}

impl LoadHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wait for the sequence to end
    pub async fn finished(self) -> SequenceOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => SequenceOutcome::Aborted,
            Err(e) => {
                tracing::error!(generation = self.generation, error = %e, "Load sequence panicked");
                SequenceOutcome::Aborted
            }
        }
    }
}

/// Orchestrates the account page load sequence
pub struct AccountLoader {
    api: Arc<dyn ExplorerApi>,
    projector: Arc<Projector>,
    config: LoaderConfig,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl AccountLoader {
    pub fn new(api: Arc<dyn ExplorerApi>, projector: Arc<Projector>, mut config: LoaderConfig) -> Self {
        // One fork per category
        let categories: BTreeSet<BlockType> = config.auxiliary.iter().copied().collect();
        config.auxiliary = categories.into_iter().collect();

        Self {
            api,
            projector,
            config,
            in_flight: Mutex::new(None),
        }
    }

    pub fn projector(&self) -> &Arc<Projector> {
        &self.projector
    }

    /// Begin a new load sequence, superseding the previous one.
    ///
    /// The primary task is pending in the projector by the time this returns.
    pub async fn submit(&self, request: LoadRequest) -> LoadHandle {
        // Held across begin + spawn so concurrent submits cannot interleave
        let mut in_flight = self.in_flight.lock().await;

        let request_id = request.request_id();
        let account = request.target().clone();
        let request_filters = request.filters().clone();
        let generation = self.projector.begin(request).await;

        tracing::info!(
            generation,
            request_id = %request_id,
            account = %account,
            filters = ?request_filters,
            "Loading account"
        );

        let join = tokio::spawn(run_sequence(
            Arc::clone(&self.api),
            Arc::clone(&self.projector),
            generation,
            account,
            self.config.auxiliary.clone(),
        ));

        if let Some(previous) = in_flight.replace(join.abort_handle()) {
            if self.config.abort_on_supersede && !previous.is_finished() {
                tracing::debug!(generation, "Aborting superseded load sequence");
                previous.abort();
            }
        }

        LoadHandle {
            generation,
            request_id,
            join,
        }
    }
}

async fn run_sequence(
    api: Arc<dyn ExplorerApi>,
    projector: Arc<Projector>,
    generation: u64,
    account: AccountId,
    auxiliary: Vec<BlockType>,
) -> SequenceOutcome {
    let outcome = match api.fetch_account(&account).await {
        Ok(found) => Ok(TaskPayload::Account(found)),
        Err(e) if e.is_not_found() => {
            tracing::debug!(generation, account = %account, "Account not found, showing as unopened");
            Ok(TaskPayload::Account(Account::unopened(&account)))
        }
        Err(e) => {
            tracing::warn!(generation, account = %account, error = %e, "Account fetch failed");
            Err(LoadFailure::from(e))
        }
    };
    let primary_ok = outcome.is_ok();

    let forks: Vec<Fork> = if primary_ok {
        std::iter::once(Fork::Detail)
            .chain(auxiliary.into_iter().map(Fork::Summary))
            .collect()
    } else {
        Vec::new()
    };

    // The primary's completion and the fork starts land as one transition
    let completed = TaskEvent::completed(generation, TaskKind::Primary, outcome);
    let events: Vec<TaskEvent> = std::iter::once(completed)
        .chain(forks.iter().map(|fork| TaskEvent::started(generation, fork.kind())))
        .collect();
    if let Err(ended) = record(&projector, events).await {
        return ended;
    }
    if !primary_ok {
        return SequenceOutcome::PrimaryFailed;
    }

    let forks = forks.into_iter().map(|fork| {
        run_fork(
            Arc::clone(&api),
            Arc::clone(&projector),
            generation,
            account.clone(),
            fork,
        )
    });
    let recorded = join_all(forks).await;

    let mut outcome = SequenceOutcome::Completed;
    for ended in recorded.into_iter().filter_map(Result::err) {
        // Staleness wins over a rejection of the same sequence
        if outcome != SequenceOutcome::Superseded {
            outcome = ended;
        }
    }
    if outcome == SequenceOutcome::Completed {
        tracing::debug!(generation, account = %account, "Load sequence completed");
    }
    outcome
}

/// Calls issued once the primary has succeeded
#[derive(Debug, Clone, Copy)]
enum Fork {
    Detail,
    Summary(BlockType),
}

impl Fork {
    fn kind(&self) -> TaskKind {
        match self {
            Fork::Detail => TaskKind::Detail,
            Fork::Summary(block_type) => TaskKind::Auxiliary(*block_type),
        }
    }
}

/// Run one detail or auxiliary fetch and record its completion
async fn run_fork(
    api: Arc<dyn ExplorerApi>,
    projector: Arc<Projector>,
    generation: u64,
    account: AccountId,
    fork: Fork,
) -> Result<(), SequenceOutcome> {
    let kind = fork.kind();
    let outcome: TaskOutcome = match fork {
        Fork::Detail => match api.fetch_account_open(&account).await {
            Ok(open) => Ok(TaskPayload::Open(open)),
            Err(e) if e.is_not_found() => Ok(TaskPayload::Open(AccountOpen::default())),
            Err(e) => Err(LoadFailure::from(e)),
        },
        Fork::Summary(block_type) => {
            match api.fetch_blocks_summary(&account, block_type).await {
                Ok(summary) => Ok(TaskPayload::Summary(summary)),
                Err(e) if e.is_not_found() => {
                    Ok(TaskPayload::Summary(BlocksSummary::empty(block_type)))
                }
                Err(e) => Err(LoadFailure::from(e)),
            }
        }
    };

    if let Err(failure) = &outcome {
        tracing::warn!(generation, kind = %kind, error = %failure, "Fetch failed");
    }

    record(
        &projector,
        vec![TaskEvent::completed(generation, kind, outcome)],
    )
    .await
}

/// Apply events atomically. On refusal, returns how the sequence ends.
async fn record(projector: &Projector, events: Vec<TaskEvent>) -> Result<(), SequenceOutcome> {
    match projector.apply_all(events).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_stale() => {
            tracing::debug!("{}, discarding", e);
            Err(SequenceOutcome::Superseded)
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected task event");
            Err(SequenceOutcome::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::fake::{Fail, FakeApi};
    use crate::load::TaskStatus;

    fn loader(api: Arc<FakeApi>, config: LoaderConfig) -> AccountLoader {
        AccountLoader::new(api, Arc::new(Projector::new()), config)
    }

    fn request(address: &str) -> LoadRequest {
        LoadRequest::for_address(address).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(
            config.auxiliary,
            vec![BlockType::Send, BlockType::Receive, BlockType::Change]
        );
        assert!(!config.abort_on_supersede);
    }

    #[tokio::test]
    async fn test_successful_load() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 12));
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let handle = loader.submit(request("1aaa")).await;
        assert_eq!(handle.generation(), 1);
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);

        let state = loader.projector().snapshot();
        assert!(state.is_loaded());
        assert!(!state.is_loading());
        assert!(!state.is_loading_detail());
        assert!(state.is_opened());
        assert!(state.is_settled());
        assert!(state.open().is_some());
        for block_type in BlockType::ALL {
            let slice = state.summary(block_type).unwrap();
            assert_eq!(slice.status, TaskStatus::Success);
            assert_eq!(slice.summary.as_ref().unwrap().block_count(), 2);
        }
    }

    #[tokio::test]
    async fn test_forks_wait_for_primary() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 3));
        api.gate("account:nano_1aaa");
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let handle = loader.submit(request("1aaa")).await;
        api.wait_for_calls("account:nano_1aaa", 1).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(api.calls(), vec!["account:nano_1aaa".to_string()]);
        assert!(loader.projector().snapshot().is_loading());

        api.release("account:nano_1aaa");
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);

        let calls = api.calls();
        assert_eq!(calls[0], "account:nano_1aaa");
        assert_eq!(calls.len(), 5);
        assert!(calls.contains(&"open:nano_1aaa".to_string()));
        assert!(calls.contains(&"summary:nano_1aaa:change".to_string()));
    }

    #[tokio::test]
    async fn test_primary_pending_once_submitted() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 3));
        api.gate("account:nano_1aaa");
        let loader = loader(Arc::clone(&api), LoaderConfig::default());
        let mut rx = loader.projector().subscribe();

        let handle = loader.submit(request("1aaa")).await;

        let state = rx.borrow_and_update().clone();
        assert_eq!(state.generation(), handle.generation());
        assert!(state.is_loading());
        assert!(!state.is_loaded());
        assert!(!state.is_settled());
        assert!(state.failure().is_none());

        api.release("account:nano_1aaa");
        let settled = rx.wait_for(|s| s.is_settled()).await.unwrap().clone();
        assert!(settled.is_loaded());
        assert!(settled.open().is_some());
        for block_type in BlockType::ALL {
            assert_eq!(
                settled.summary(block_type).unwrap().status,
                TaskStatus::Success
            );
        }
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);
    }

    #[tokio::test]
    async fn test_primary_failure_stops_sequence() {
        let api = Arc::new(FakeApi::new().with_failure("account:nano_1aaa", Fail::Network));
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let handle = loader.submit(request("1aaa")).await;
        assert_eq!(handle.finished().await, SequenceOutcome::PrimaryFailed);

        let state = loader.projector().snapshot();
        assert!(!state.is_loaded());
        assert!(!state.is_loading());
        assert!(matches!(state.failure(), Some(LoadFailure::Network(_))));
        assert_eq!(state.summaries().count(), 0);
        assert!(state.open().is_none());
        assert_eq!(api.calls(), vec!["account:nano_1aaa".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_account_is_unopened() {
        let api = Arc::new(FakeApi::new());
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let handle = loader.submit(request("1new")).await;
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);

        let state = loader.projector().snapshot();
        assert!(state.is_loaded());
        assert!(!state.is_opened());
        assert!(state.failure().is_none());
        assert_eq!(state.account().unwrap().account, "nano_1new");
    }

    #[tokio::test]
    async fn test_zero_block_count_not_opened() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 0));
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        loader.submit(request("1aaa")).await.finished().await;

        let state = loader.projector().snapshot();
        assert!(state.is_loaded());
        assert!(!state.is_opened());
    }

    #[tokio::test]
    async fn test_auxiliary_failure_isolated() {
        let api = Arc::new(
            FakeApi::new()
                .with_account("nano_1aaa", 4)
                .with_failure("summary:nano_1aaa:receive", Fail::Status(500)),
        );
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let handle = loader.submit(request("1aaa")).await;
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);

        let state = loader.projector().snapshot();
        assert!(state.is_loaded());
        assert!(state.failure().is_none());
        assert_eq!(
            state.summary(BlockType::Receive).unwrap().status,
            TaskStatus::Failure
        );
        assert_eq!(
            state.summary(BlockType::Send).unwrap().status,
            TaskStatus::Success
        );
        assert_eq!(
            state.summary(BlockType::Change).unwrap().status,
            TaskStatus::Success
        );
    }

    #[tokio::test]
    async fn test_auxiliary_out_of_order() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 4));
        api.gate("summary:nano_1aaa:send");
        let loader = loader(Arc::clone(&api), LoaderConfig::default());
        let mut rx = loader.projector().subscribe();

        let handle = loader.submit(request("1aaa")).await;

        // Everything but the gated send summary lands
        rx.wait_for(|s| {
            s.summary(BlockType::Change)
                .map(|slice| slice.status == TaskStatus::Success)
                .unwrap_or(false)
                && s.summary(BlockType::Receive)
                    .map(|slice| slice.status == TaskStatus::Success)
                    .unwrap_or(false)
                && !s.is_loading()
        })
        .await
        .unwrap();

        let state = loader.projector().snapshot();
        assert!(state.is_loaded());
        assert_eq!(
            state.summary(BlockType::Send).unwrap().status,
            TaskStatus::Pending
        );
        assert!(!state.is_settled());

        api.release("summary:nano_1aaa:send");
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);
        assert!(loader.projector().snapshot().is_settled());
    }

    #[tokio::test]
    async fn test_latest_request_wins() {
        let api = Arc::new(
            FakeApi::new()
                .with_account("nano_1aaa", 1)
                .with_account("nano_1bbb", 2),
        );
        api.gate("account:nano_1aaa");
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let first = loader.submit(request("1aaa")).await;
        api.wait_for_calls("account:nano_1aaa", 1).await;

        let second = loader.submit(request("1bbb")).await;
        assert_eq!(second.finished().await, SequenceOutcome::Completed);
        let settled = loader.projector().snapshot();
        assert_eq!(settled.account().unwrap().account, "nano_1bbb");

        // A resolves after B took over
        api.release("account:nano_1aaa");
        assert_eq!(first.finished().await, SequenceOutcome::Superseded);

        let state = loader.projector().snapshot();
        assert_eq!(state, settled);
        assert_eq!(state.generation(), 2);
        assert_eq!(state.request().unwrap().target().as_str(), "nano_1bbb");
        assert_eq!(api.call_count("open:nano_1aaa"), 0);
        assert_eq!(api.call_count("summary:nano_1aaa:send"), 0);
    }

    #[tokio::test]
    async fn test_stale_forks_do_not_mutate_state() {
        let api = Arc::new(
            FakeApi::new()
                .with_account("nano_1aaa", 1)
                .with_account("nano_1bbb", 2),
        );
        api.gate("open:nano_1aaa");
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        let first = loader.submit(request("1aaa")).await;
        api.wait_for_calls("open:nano_1aaa", 1).await;

        let second = loader.submit(request("1bbb")).await;
        second.finished().await;
        let settled = loader.projector().snapshot();

        api.release("open:nano_1aaa");
        assert_eq!(first.finished().await, SequenceOutcome::Superseded);
        assert_eq!(loader.projector().snapshot(), settled);
    }

    #[tokio::test]
    async fn test_resubmit_same_target() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 1));
        let loader = loader(Arc::clone(&api), LoaderConfig::default());

        loader.submit(request("1aaa")).await.finished().await;
        let handle = loader.submit(request("1aaa")).await;
        assert_eq!(handle.generation(), 2);
        handle.finished().await;

        assert_eq!(api.call_count("account:nano_1aaa"), 2);
        assert_eq!(loader.projector().snapshot().generation(), 2);
    }

    #[tokio::test]
    async fn test_abort_on_supersede() {
        let api = Arc::new(
            FakeApi::new()
                .with_account("nano_1aaa", 1)
                .with_account("nano_1bbb", 2),
        );
        api.gate("account:nano_1aaa");
        let loader = loader(
            Arc::clone(&api),
            LoaderConfig {
                abort_on_supersede: true,
                ..LoaderConfig::default()
            },
        );

        let first = loader.submit(request("1aaa")).await;
        api.wait_for_calls("account:nano_1aaa", 1).await;
        let second = loader.submit(request("1bbb")).await;

        assert_eq!(first.finished().await, SequenceOutcome::Aborted);
        assert_eq!(second.finished().await, SequenceOutcome::Completed);
        assert_eq!(
            loader.projector().snapshot().account().unwrap().account,
            "nano_1bbb"
        );
    }

    #[tokio::test]
    async fn test_repeated_category_fetched_once() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 1));
        let loader = loader(
            Arc::clone(&api),
            LoaderConfig {
                auxiliary: vec![BlockType::Send, BlockType::Change, BlockType::Send],
                ..LoaderConfig::default()
            },
        );

        let handle = loader.submit(request("1aaa")).await;
        assert_eq!(handle.finished().await, SequenceOutcome::Completed);

        assert_eq!(api.call_count("summary:nano_1aaa:send"), 1);
        assert_eq!(api.call_count("summary:nano_1aaa:change"), 1);
        assert_eq!(api.call_count("summary:nano_1aaa:receive"), 0);

        let state = loader.projector().snapshot();
        assert!(state.is_settled());
        assert_eq!(
            state.summary(BlockType::Send).unwrap().status,
            TaskStatus::Success
        );
    }

    #[tokio::test]
    async fn test_no_auxiliary_categories() {
        let api = Arc::new(FakeApi::new().with_account("nano_1aaa", 1));
        let loader = loader(
            Arc::clone(&api),
            LoaderConfig {
                auxiliary: Vec::new(),
                ..LoaderConfig::default()
            },
        );

        loader.submit(request("1aaa")).await.finished().await;
        assert_eq!(
            api.calls(),
            vec!["account:nano_1aaa".to_string(), "open:nano_1aaa".to_string()]
        );
        assert!(loader.projector().snapshot().is_settled());
    }
}
