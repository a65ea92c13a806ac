//! Load requests
//!
//! A `LoadRequest` names the page target and its filters. It is immutable
//! once built; the loader stamps it with a generation when it is submitted.

use uuid::Uuid;

use crate::api::{AccountId, ApiResult, Filters};

/// Request to load one page target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    request_id: Uuid,
    target: AccountId,
    filters: Filters,
}

impl LoadRequest {
    pub fn new(target: AccountId) -> Self {
        Self::with_filters(target, Filters::default())
    }

    pub fn with_filters(target: AccountId, filters: Filters) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            target,
            filters,
        }
    }

    /// Build a request from a route address (with or without `nano_`)
    pub fn for_address(address: &str) -> ApiResult<Self> {
        Ok(Self::new(AccountId::parse(address)?))
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn target(&self) -> &AccountId {
        &self.target
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }
}
