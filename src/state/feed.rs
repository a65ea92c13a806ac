//! Post feed state
//!
//! Latest-wins per feed: a newer load (e.g. a different age window) bumps the
//! feed's generation and completions of older loads are ignored.

use crate::api::{FeedId, Filters, Post};
use crate::load::LoadFailure;

/// Placeholder cards shown while a feed loads for the first time
pub const SKELETON_COUNT: usize = 3;

/// What a feed renders
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItems<'a> {
    /// Nothing to show; the feed is omitted from the page
    Hidden,
    /// Loading with no posts yet
    Skeletons(usize),
    Posts(&'a [Post]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    feed: FeedId,
    generation: u64,
    filters: Filters,
    is_pending: bool,
    posts: Vec<Post>,
    failure: Option<LoadFailure>,
}

impl FeedState {
    pub fn new(feed: FeedId) -> Self {
        Self {
            feed,
            generation: 0,
            filters: Filters::default(),
            is_pending: false,
            posts: Vec::new(),
            failure: None,
        }
    }

    /// Start a load with `filters`; returns its generation
    pub(crate) fn begin(&mut self, filters: Filters) -> u64 {
        self.generation += 1;
        self.filters = filters;
        self.is_pending = true;
        self.generation
    }

    /// Record a completion. Returns `false` if `generation` is stale.
    pub(crate) fn complete(&mut self, generation: u64, result: Result<Vec<Post>, LoadFailure>) -> bool {
        if generation != self.generation {
            return false;
        }

        self.is_pending = false;
        match result {
            Ok(posts) => {
                self.posts = posts;
                self.failure = None;
            }
            Err(failure) => self.failure = Some(failure),
        }
        true
    }

    pub fn feed(&self) -> &FeedId {
        &self.feed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    /// Label of the selected age window, if the feed has a selector
    pub fn age_label(&self) -> Option<&'static str> {
        self.filters.age.and_then(|age| self.feed.age_label(age))
    }

    pub fn items(&self) -> FeedItems<'_> {
        if !self.posts.is_empty() {
            FeedItems::Posts(&self.posts)
        } else if self.is_pending {
            FeedItems::Skeletons(SKELETON_COUNT)
        } else {
            FeedItems::Hidden
        }
    }
}
