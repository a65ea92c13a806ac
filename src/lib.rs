//! # Nanoscope
//!
//! Data-loading core of a Nano network explorer: the async effects that
//! fetch account pages, post feeds and representatives from the explorer
//! API, and the render-ready state derived from them.
//!
//! ## Modules
//!
//! - [`api`]: Explorer API records, trait and HTTP client
//! - [`load`]: Loaders (takeLatest account sequence, per-feed latest-wins,
//!   takeEvery list refresh) and the task reducer
//! - [`state`]: Projector and page/feed/list state
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nanoscope::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(ExplorerClient::new(ClientConfig::default())?);
//!     let projector = Arc::new(Projector::new());
//!     let loader = AccountLoader::new(api, Arc::clone(&projector), LoaderConfig::default());
//!
//!     let handle = loader.submit(LoadRequest::for_address("nano_1abc")?).await;
//!     handle.finished().await;
//!
//!     let page = projector.snapshot();
//!     println!("loaded={} opened={}", page.is_loaded(), page.is_opened());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod load;
pub mod state;

// Re-export top-level types for convenience
pub use api::{
    Account, AccountId, AccountOpen, AgeWindow, ApiError, ApiResult, BlockType, BlocksSummary,
    ClientConfig, ExplorerApi, ExplorerClient, FeedId, Filters, Post, Representative, Telemetry,
};

pub use load::{
    AccountLoader, FeedLoader, LoadError, LoadFailure, LoadHandle, LoadRequest, LoaderConfig,
    RepresentativesLoader, SequenceOutcome, TaskEvent, TaskKind, TaskSet, TaskStatus,
};

pub use state::{FeedItems, FeedState, ListState, PageState, Projector, TelemetryStat};

pub use config::{generate_default_config, Config, ConfigError};
