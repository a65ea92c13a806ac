//! Loaders
//!
//! Async effects that fetch from the explorer backend and feed results into
//! page state.
//!
//! - **AccountLoader**: takeLatest account sequence (primary, then detail and
//!   block summaries concurrently)
//! - **FeedLoader**: latest-wins per post feed
//! - **RepresentativesLoader**: takeEvery list refresh
//! - **TaskSet**: generation-stamped task reducer behind the account page

mod error;
mod every;
mod feed;
mod orchestrator;
mod request;
mod task;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{LoadError, LoadFailure, LoadResult};
pub use every::RepresentativesLoader;
pub use feed::FeedLoader;
pub use orchestrator::{AccountLoader, LoadHandle, LoaderConfig, SequenceOutcome};
pub use request::LoadRequest;
pub use task::{LoadTask, TaskEvent, TaskKind, TaskOutcome, TaskPayload, TaskSet, TaskStatus};
