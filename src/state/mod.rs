//! Page State
//!
//! Render-ready views over the loaders' work:
//!
//! - **Projector**: single writer of the account page's task set
//! - **PageState**: flags derived from the task set
//! - **FeedState** / **ListState**: post feeds and the representatives list
//! - **telemetry**: chart series for representative accounts

mod feed;
mod list;
mod page;
mod projector;
pub mod telemetry;

pub use feed::{FeedItems, FeedState, SKELETON_COUNT};
pub use list::ListState;
pub use page::{PageState, SummarySlice};
pub use projector::Projector;
pub use telemetry::{series, TelemetryStat};
