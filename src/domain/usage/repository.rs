//! Usage repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::event::{DailyUsageKey, UsageEvent};
use crate::domain::organization::OrganizationId;
use crate::domain::DomainError;

/// Append-only usage store.
///
/// `insert_event` and `increment_daily` are kept separate so the recorder
/// can write both; the sum of daily aggregates over a period must equal the
/// event count for that period, with eventual consistency acceptable during
/// outages of the best-effort write path.
#[async_trait]
pub trait UsageRepository: Send + Sync + Debug {
    async fn insert_event(&self, event: &UsageEvent) -> Result<(), DomainError>;

    async fn increment_daily(
        &self,
        key: &DailyUsageKey,
        requests: u64,
        tokens: u64,
    ) -> Result<(), DomainError>;

    /// Total requests recorded for an organization in the calendar month
    /// containing `at`. Drives the monthly quota check.
    async fn monthly_requests(
        &self,
        organization_id: OrganizationId,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    async fn events_in_period(
        &self,
        organization_id: OrganizationId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UsageEvent>, DomainError>;
}
