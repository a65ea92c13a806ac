//! Explorer REST API Client
//!
//! HTTP client for the explorer backend. Every call is a single GET; retries
//! are left to the caller (re-submitting a load).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use super::types::{
    Account, AccountId, AccountOpen, BlockType, BlocksSummary, FeedId, Filters, Post,
    Representative, SummaryEntry,
};
use super::ExplorerApi;

/// Explorer REST API client
pub struct ExplorerClient {
    client: Client,
    config: ClientConfig,
}

/// Configuration for the explorer client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the explorer API (e.g., "https://nano.community/api")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Maximum counterparties per blocks summary
    pub summary_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nano.community/api".to_string(),
            request_timeout_ms: 5000,
            user_agent: format!("nanoscope/{}", env!("CARGO_PKG_VERSION")),
            summary_limit: 10,
        }
    }
}

impl ExplorerClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET `path` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from_send)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn account_path(account: &AccountId) -> String {
    format!("accounts/{}", urlencoding::encode(account.as_str()))
}

#[async_trait]
impl ExplorerApi for ExplorerClient {
    async fn fetch_account(&self, account: &AccountId) -> ApiResult<Account> {
        self.get_json(&account_path(account), &[]).await
    }

    async fn fetch_account_open(&self, account: &AccountId) -> ApiResult<AccountOpen> {
        self.get_json(&format!("{}/open", account_path(account)), &[])
            .await
    }

    async fn fetch_blocks_summary(
        &self,
        account: &AccountId,
        block_type: BlockType,
    ) -> ApiResult<BlocksSummary> {
        let path = format!("{}/blocks/{}/summary", account_path(account), block_type);
        let entries: Vec<SummaryEntry> = self
            .get_json(&path, &[("limit", self.config.summary_limit.to_string())])
            .await?;

        Ok(BlocksSummary {
            block_type,
            entries,
        })
    }

    async fn fetch_representatives(&self) -> ApiResult<Vec<Representative>> {
        self.get_json("representatives", &[]).await
    }

    async fn fetch_posts(&self, feed: &FeedId, filters: &Filters) -> ApiResult<Vec<Post>> {
        let path = format!("posts/{}", urlencoding::encode(feed.as_str()));
        self.get_json(&path, &filters.query_pairs()).await
    }
}
