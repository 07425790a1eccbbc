//! Per-organization rate limiting
//!
//! Two window stores satisfy the same contract: an in-process map, correct
//! only for single-node deployments, and a Redis-backed atomic counter
//! shared across all serving nodes. The backend is picked at startup via
//! configuration, never as ambient global state.

mod local;
mod redis;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::organization::OrganizationId;

pub use local::LocalWindowStore;
pub use self::redis::RedisWindowStore;

/// Length of the rate window in seconds
pub const WINDOW_SECS: u64 = 60;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed {
        /// Requests left in the current window
        remaining: u32,
    },
    Denied {
        /// Seconds until the window resets, always positive
        retry_after_secs: u64,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Shared counter deciding whether a request proceeds.
///
/// `hit` counts the request and compares against the limit in one step.
/// Implementations never surface counter faults to the caller: an
/// unreachable counter fails open, trading strict enforcement for
/// availability.
#[async_trait]
pub trait RateLimitStore: Send + Sync + Debug {
    async fn hit(&self, organization_id: OrganizationId, limit: u32) -> RateDecision;
}
