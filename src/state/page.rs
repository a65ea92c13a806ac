//! Account page state
//!
//! `PageState` is a pure projection of the current `TaskSet`. It is rebuilt
//! from scratch on every task transition and never mutated in place.

use std::collections::BTreeMap;

use crate::api::{Account, AccountOpen, BlockType, BlocksSummary};
use crate::load::{LoadFailure, LoadRequest, TaskKind, TaskPayload, TaskSet, TaskStatus};

/// Render-ready state of the account page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    generation: u64,
    request: Option<LoadRequest>,
    account: Option<Account>,
    open: Option<AccountOpen>,
    is_loading: bool,
    is_loaded: bool,
    is_loading_detail: bool,
    is_opened: bool,
    failure: Option<LoadFailure>,
    detail_failure: Option<LoadFailure>,
    summaries: BTreeMap<BlockType, SummarySlice>,
    pending: usize,
}

/// State of one auxiliary category
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySlice {
    pub status: TaskStatus,
    pub summary: Option<BlocksSummary>,
    pub failure: Option<LoadFailure>,
}

impl PageState {
    /// Project the task set into page state
    pub fn project(tasks: &TaskSet) -> Self {
        let mut state = PageState {
            generation: tasks.generation(),
            request: tasks.request().cloned(),
            ..PageState::default()
        };

        for task in tasks.tasks() {
            if task.is_pending() {
                state.pending += 1;
            }

            match task.kind() {
                TaskKind::Primary => {
                    state.is_loading |= task.is_pending();
                    state.failure = task.failure().cloned();
                    if let Some(TaskPayload::Account(account)) = task.payload() {
                        state.is_loaded = true;
                        state.is_opened = account.is_opened();
                        state.account = Some(account.clone());
                    }
                }
                TaskKind::Detail => {
                    state.is_loading |= task.is_pending();
                    state.is_loading_detail = task.is_pending();
                    state.detail_failure = task.failure().cloned();
                    if let Some(TaskPayload::Open(open)) = task.payload() {
                        state.open = Some(open.clone());
                    }
                }
                TaskKind::Auxiliary(block_type) => {
                    let summary = match task.payload() {
                        Some(TaskPayload::Summary(summary)) => Some(summary.clone()),
                        _ => None,
                    };
                    state.summaries.insert(
                        block_type,
                        SummarySlice {
                            status: task.status(),
                            summary,
                            failure: task.failure().cloned(),
                        },
                    );
                }
            }
        }

        state
    }

    /// Generation of the request this state was projected from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> Option<&LoadRequest> {
        self.request.as_ref()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn open(&self) -> Option<&AccountOpen> {
        self.open.as_ref()
    }

    /// Primary or detail fetch in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Primary fetch succeeded
    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn is_loading_detail(&self) -> bool {
        self.is_loading_detail
    }

    /// Account has at least one block
    pub fn is_opened(&self) -> bool {
        self.is_opened
    }

    /// Terminal failure of the primary fetch
    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    pub fn detail_failure(&self) -> Option<&LoadFailure> {
        self.detail_failure.as_ref()
    }

    pub fn summary(&self, block_type: BlockType) -> Option<&SummarySlice> {
        self.summaries.get(&block_type)
    }

    pub fn summaries(&self) -> impl Iterator<Item = (&BlockType, &SummarySlice)> {
        self.summaries.iter()
    }

    /// No task of the current request is still pending
    pub fn is_settled(&self) -> bool {
        self.request.is_some() && self.pending == 0
    }

    /// The page shows its progress bar
    pub fn show_progress(&self) -> bool {
        !self.is_loaded || self.is_loading || self.is_loading_detail
    }

    /// The copy-address button is offered
    pub fn can_copy_address(&self) -> bool {
        !self.is_loading
    }

    pub fn is_representative(&self) -> bool {
        self.account
            .as_ref()
            .map(|account| account.representative)
            .unwrap_or(false)
    }

    /// Balance in raw, once the account is loaded
    pub fn balance(&self) -> Option<&str> {
        if !self.is_loaded {
            return None;
        }
        self.account
            .as_ref()
            .and_then(|account| account.account_meta.balance.as_deref())
    }
}
