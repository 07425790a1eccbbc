//! In-process fixed-window rate limiter
//!
//! One counter per organization, reset when the window ages out. Correct
//! only under single-process deployment: with multiple nodes each keeps its
//! own window and the effective limit is under-counted. Concurrent requests
//! straddling a window reset can admit up to twice the limit; both are
//! known, accepted behavior of this backend. The whole map is disposable
//! and rebuilt from nothing on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::organization::OrganizationId;

use super::{RateDecision, RateLimitStore, WINDOW_SECS};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Debug)]
pub struct LocalWindowStore {
    windows: Arc<RwLock<HashMap<OrganizationId, Window>>>,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl LocalWindowStore {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let mut windows = self.windows.write().await;
            windows.retain(|_, w| w.started.elapsed() <= Duration::from_secs(WINDOW_SECS));
        }
    }
}

impl Default for LocalWindowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for LocalWindowStore {
    async fn hit(&self, organization_id: OrganizationId, limit: u32) -> RateDecision {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let window = windows.entry(organization_id).or_insert(Window {
            count: 0,
            started: now,
        });

        let elapsed = now.saturating_duration_since(window.started);

        if elapsed > Duration::from_secs(WINDOW_SECS) {
            window.count = 0;
            window.started = now;
        }

        if window.count < limit {
            window.count += 1;
            return RateDecision::Allowed {
                remaining: limit - window.count,
            };
        }

        let elapsed_ms = now
            .saturating_duration_since(window.started)
            .as_millis() as u64;
        let remaining_ms = (WINDOW_SECS * 1000).saturating_sub(elapsed_ms);
        let retry_after_secs = remaining_ms.div_ceil(1000).max(1);

        RateDecision::Denied { retry_after_secs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let store = LocalWindowStore::new();
        let org = OrganizationId::generate();

        for i in 0..5u32 {
            let decision = store.hit(org, 5).await;
            assert_eq!(decision, RateDecision::Allowed { remaining: 4 - i });
        }
    }

    #[tokio::test]
    async fn test_denies_over_limit_with_positive_retry() {
        let store = LocalWindowStore::new();
        let org = OrganizationId::generate();

        for _ in 0..3 {
            assert!(store.hit(org, 3).await.is_allowed());
        }

        match store.hit(org, 3).await {
            RateDecision::Denied { retry_after_secs } => {
                assert!(retry_after_secs >= 1);
                assert!(retry_after_secs <= WINDOW_SECS);
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    async fn backdate_window(store: &LocalWindowStore, org: OrganizationId, count: u32, age: Duration) {
        let Some(started) = Instant::now().checked_sub(age) else {
            return;
        };
        store
            .windows
            .write()
            .await
            .insert(org, Window { count, started });
    }

    #[tokio::test]
    async fn test_window_resets_just_past_the_boundary() {
        let store = LocalWindowStore::new();
        let org = OrganizationId::generate();

        // 60.2s old: older than the window even before a full extra second
        backdate_window(&store, org, 3, Duration::from_millis(60_200)).await;

        assert_eq!(
            store.hit(org, 3).await,
            RateDecision::Allowed { remaining: 2 }
        );
    }

    #[tokio::test]
    async fn test_window_holds_until_the_boundary() {
        let store = LocalWindowStore::new();
        let org = OrganizationId::generate();

        backdate_window(&store, org, 3, Duration::from_millis(59_500)).await;

        assert!(!store.hit(org, 3).await.is_allowed());
    }

    #[tokio::test]
    async fn test_organizations_are_independent() {
        let store = LocalWindowStore::new();
        let org_a = OrganizationId::generate();
        let org_b = OrganizationId::generate();

        assert!(store.hit(org_a, 1).await.is_allowed());
        assert!(!store.hit(org_a, 1).await.is_allowed());

        assert!(store.hit(org_b, 1).await.is_allowed());
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let store = LocalWindowStore::new();
        let org = OrganizationId::generate();

        assert_eq!(
            store.hit(org, 3).await,
            RateDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            store.hit(org, 3).await,
            RateDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            store.hit(org, 3).await,
            RateDecision::Allowed { remaining: 0 }
        );
        assert!(!store.hit(org, 3).await.is_allowed());
    }
}
