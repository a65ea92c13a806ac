//! Scripted in-memory `ExplorerApi` for loader tests.
//!
//! Every call is logged under a key (`account:nano_x`, `open:nano_x`,
//! `summary:nano_x:send`, `reps`, `posts:top`) before it resolves. A key can
//! be held behind a gate so tests decide when, and in which order, calls
//! complete.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

use crate::api::{
    Account, AccountId, AccountOpen, ApiError, ApiResult, BlockType, BlocksSummary,
    ExplorerApi, FeedId, Filters, Post, Representative, SummaryEntry,
};

/// Scripted failure for a call key
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fail {
    NotFound,
    Network,
    Status(u16),
}

impl Fail {
    fn into_error(self, key: &str) -> ApiError {
        match self {
            Fail::NotFound => ApiError::NotFound(key.to_string()),
            Fail::Network => ApiError::Unavailable,
            Fail::Status(status) => ApiError::Api {
                status,
                message: format!("scripted failure for {}", key),
            },
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<String>>,
    called: Notify,
    accounts: Mutex<HashMap<String, Account>>,
    failures: Mutex<HashMap<String, Fail>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    representatives: Mutex<Vec<Representative>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an account with the given block count
    pub(crate) fn with_account(self, address: &str, block_count: u64) -> Self {
        let mut account = Account::default();
        account.account = address.to_string();
        account.account_meta.block_count = block_count;
        account.account_meta.balance = Some("1000000".to_string());
        self.accounts
            .lock()
            .unwrap()
            .insert(address.to_string(), account);
        self
    }

    pub(crate) fn with_failure(self, key: &str, fail: Fail) -> Self {
        self.failures.lock().unwrap().insert(key.to_string(), fail);
        self
    }

    pub(crate) fn with_representatives(self, count: usize) -> Self {
        let reps = (0..count)
            .map(|i| Representative {
                account: format!("nano_rep{}", i),
                ..Representative::default()
            })
            .collect();
        *self.representatives.lock().unwrap() = reps;
        self
    }

    /// Hold calls for `key` until [`FakeApi::release`] is called
    pub(crate) fn gate(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held call for `key` through
    pub(crate) fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(key) {
            gate.add_permits(1);
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == key).count()
    }

    /// Wait until `key` has been called at least `times` times
    pub(crate) async fn wait_for_calls(&self, key: &str, times: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let called = self.called.notified();
                tokio::pin!(called);
                // Register before checking so a call in between is not missed
                called.as_mut().enable();
                if self.call_count(key) >= times {
                    return;
                }
                called.await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {} x{}", key, times));
    }

    async fn enter(&self, key: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(key.to_string());
        self.called.notify_waiters();

        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            // Each release admits exactly one call
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match self.failures.lock().unwrap().get(key) {
            Some(fail) => Err(fail.into_error(key)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExplorerApi for FakeApi {
    async fn fetch_account(&self, account: &AccountId) -> ApiResult<Account> {
        let key = format!("account:{}", account);
        self.enter(&key).await?;
        self.accounts
            .lock()
            .unwrap()
            .get(account.as_str())
            .cloned()
            .ok_or(ApiError::NotFound(key))
    }

    async fn fetch_account_open(&self, account: &AccountId) -> ApiResult<AccountOpen> {
        self.enter(&format!("open:{}", account)).await?;
        Ok(AccountOpen {
            open_timestamp: Some(1_600_000_000),
            ..AccountOpen::default()
        })
    }

    async fn fetch_blocks_summary(
        &self,
        account: &AccountId,
        block_type: BlockType,
    ) -> ApiResult<BlocksSummary> {
        self.enter(&format!("summary:{}:{}", account, block_type))
            .await?;
        Ok(BlocksSummary {
            block_type,
            entries: vec![SummaryEntry {
                destination_account: format!("nano_{}_peer", block_type),
                block_count: 2,
                ..SummaryEntry::default()
            }],
        })
    }

    async fn fetch_representatives(&self) -> ApiResult<Vec<Representative>> {
        self.enter("reps").await?;
        Ok(self.representatives.lock().unwrap().clone())
    }

    async fn fetch_posts(&self, feed: &FeedId, filters: &Filters) -> ApiResult<Vec<Post>> {
        let key = match filters.age {
            Some(age) => format!("posts:{}:{}", feed, age.hours()),
            None => format!("posts:{}", feed),
        };
        self.enter(&key).await?;
        Ok(vec![Post {
            title: key,
            score: 1,
            ..Post::default()
        }])
    }
}
