//! In-memory usage repository

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::organization::OrganizationId;
use crate::domain::usage::{DailyUsage, DailyUsageKey, UsageEvent, UsageRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    events: Vec<UsageEvent>,
    daily: HashMap<DailyUsageKey, (u64, u64)>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUsageRepository {
    store: Arc<RwLock<Store>>,
    should_fail: Arc<RwLock<bool>>,
    should_fail_writes: Arc<RwLock<bool>>,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Fail only the write path, leaving quota reads working. Models a
    /// usage-sink outage during normal serving.
    pub async fn set_should_fail_writes(&self, should_fail: bool) {
        *self.should_fail_writes.write().await = should_fail;
    }

    async fn check_should_fail_writes(&self) -> Result<(), DomainError> {
        if *self.should_fail_writes.read().await {
            return Err(DomainError::storage("Simulated usage sink outage"));
        }

        self.check_should_fail().await
    }

    pub async fn event_count(&self) -> usize {
        self.store.read().await.events.len()
    }

    pub async fn daily_aggregates(&self) -> Vec<DailyUsage> {
        self.store
            .read()
            .await
            .daily
            .iter()
            .map(|(key, (requests, tokens))| DailyUsage {
                key: key.clone(),
                requests: *requests,
                tokens: *tokens,
            })
            .collect()
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Simulated storage failure"));
        }

        Ok(())
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn insert_event(&self, event: &UsageEvent) -> Result<(), DomainError> {
        self.check_should_fail_writes().await?;

        self.store.write().await.events.push(event.clone());

        Ok(())
    }

    async fn increment_daily(
        &self,
        key: &DailyUsageKey,
        requests: u64,
        tokens: u64,
    ) -> Result<(), DomainError> {
        self.check_should_fail_writes().await?;

        let mut store = self.store.write().await;
        let entry = store.daily.entry(key.clone()).or_insert((0, 0));
        entry.0 += requests;
        entry.1 += tokens;

        Ok(())
    }

    async fn monthly_requests(
        &self,
        organization_id: OrganizationId,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        let count = store
            .events
            .iter()
            .filter(|e| {
                e.organization_id == organization_id
                    && e.timestamp.year() == at.year()
                    && e.timestamp.month() == at.month()
            })
            .count();

        Ok(count as u64)
    }

    async fn events_in_period(
        &self,
        organization_id: OrganizationId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UsageEvent>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store
            .events
            .iter()
            .filter(|e| {
                e.organization_id == organization_id && e.timestamp >= from && e.timestamp < to
            })
            .cloned()
            .collect())
    }
}
