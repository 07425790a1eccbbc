//! Redis-backed fixed-window rate limiter
//!
//! Shared counter per organization so every node sees the same window.
//! INCR is atomic; the first hit in a window sets the expiry, and a key
//! found without one gets its expiry reinstalled. Any Redis failure fails
//! open: a broken counter must not take the whole API down.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

use crate::domain::organization::OrganizationId;

use super::{RateDecision, RateLimitStore, WINDOW_SECS};

pub struct RedisWindowStore {
    connection: ConnectionManager,
}

impl RedisWindowStore {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection })
    }

    fn key(organization_id: OrganizationId) -> String {
        format!("rl:{}", organization_id)
    }

    async fn try_hit(
        &self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> Result<RateDecision, redis::RedisError> {
        let key = Self::key(organization_id);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;

        if count == 1 {
            let _: bool = conn.expire(&key, WINDOW_SECS as i64).await?;
        }

        if count <= limit as u64 {
            return Ok(RateDecision::Allowed {
                remaining: limit - count as u32,
            });
        }

        // TTL is -1 when the EXPIRE after the first INCR was lost to a
        // crash. Without repair the counter never resets and the org is
        // denied forever, so reinstall the window expiry here.
        let ttl: i64 = conn.ttl(&key).await?;
        let retry_after_secs = match retry_hint(ttl) {
            Some(secs) => secs,
            None => {
                let _: bool = conn.expire(&key, WINDOW_SECS as i64).await?;
                WINDOW_SECS
            }
        };

        Ok(RateDecision::Denied { retry_after_secs })
    }
}

/// A usable retry hint from a key's TTL, `None` when the expiry is missing
/// and must be reinstalled.
fn retry_hint(ttl: i64) -> Option<u64> {
    (ttl > 0).then_some(ttl as u64)
}

impl std::fmt::Debug for RedisWindowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisWindowStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl RateLimitStore for RedisWindowStore {
    async fn hit(&self, organization_id: OrganizationId, limit: u32) -> RateDecision {
        match self.try_hit(organization_id, limit).await {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    error = %err,
                    "rate limit counter unavailable, allowing request"
                );

                RateDecision::Allowed { remaining: 0 }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_ttl_is_the_retry_hint() {
        assert_eq!(retry_hint(37), Some(37));
        assert_eq!(retry_hint(1), Some(1));
    }

    #[test]
    fn test_missing_expiry_demands_repair() {
        assert_eq!(retry_hint(-1), None);
        assert_eq!(retry_hint(-2), None);
        assert_eq!(retry_hint(0), None);
    }
}
