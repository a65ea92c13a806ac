//! Explorer API
//!
//! Outbound boundary of the crate: the records the explorer backend returns
//! and the calls the loaders make against it.
//!
//! - **ExplorerApi**: async trait the loaders depend on
//! - **ExplorerClient**: `reqwest` implementation over HTTP
//! - **types**: domain records and request identifiers

mod client;
mod error;
pub mod types;

pub use client::{ClientConfig, ExplorerClient};
pub use error::{ApiError, ApiResult};
pub use types::{
    Account, AccountId, AccountMeta, AccountOpen, AgeWindow, BlockType, BlocksSummary, FeedId,
    Filters, Post, Representative, SummaryEntry, Telemetry,
};

use async_trait::async_trait;

/// Calls the loaders make against the explorer backend
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Fetch the account record (primary fetch of the account page)
    async fn fetch_account(&self, account: &AccountId) -> ApiResult<Account>;

    /// Fetch the account's opening information (detail fetch)
    async fn fetch_account_open(&self, account: &AccountId) -> ApiResult<AccountOpen>;

    /// Fetch the per-counterparty summary of one block category
    async fn fetch_blocks_summary(
        &self,
        account: &AccountId,
        block_type: BlockType,
    ) -> ApiResult<BlocksSummary>;

    /// Fetch the representatives list
    async fn fetch_representatives(&self) -> ApiResult<Vec<Representative>>;

    /// Fetch the posts of a feed
    async fn fetch_posts(&self, feed: &FeedId, filters: &Filters) -> ApiResult<Vec<Post>>;
}
