//! Usage event and daily aggregate entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::credential::CredentialId;
use crate::domain::organization::OrganizationId;

/// Source tag used when the client does not declare one
pub const DEFAULT_SOURCE: &str = "api";

/// One row per served request, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: Uuid,
    pub credential_id: CredentialId,
    pub organization_id: OrganizationId,
    /// Route template, e.g. `/v1/vehicles`
    pub endpoint: String,
    pub method: String,
    /// Client-declared attribution tag, purely informational
    pub source: String,
    pub status: u16,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Request parameters worth keeping for billing disputes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl UsageEvent {
    pub fn new(
        credential_id: CredentialId,
        organization_id: OrganizationId,
        endpoint: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            credential_id,
            organization_id,
            endpoint: endpoint.into(),
            method: method.into(),
            source: DEFAULT_SOURCE.to_string(),
            status: 200,
            latency_ms: 0,
            timestamp: Utc::now(),
            params: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Aggregate key this event rolls up into
    pub fn daily_key(&self) -> DailyUsageKey {
        DailyUsageKey {
            organization_id: self.organization_id,
            date: self.timestamp.date_naive(),
            source: self.source.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Key of a daily aggregate row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyUsageKey {
    pub organization_id: OrganizationId,
    pub date: NaiveDate,
    pub source: String,
    pub endpoint: String,
}

/// Monotonically incremented per-day counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsage {
    pub key: DailyUsageKey,
    pub requests: u64,
    pub tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = UsageEvent::new(
            CredentialId::generate(),
            OrganizationId::generate(),
            "/v1/vehicles",
            "GET",
        )
        .with_source("dashboard")
        .with_status(404)
        .with_latency_ms(12);

        assert_eq!(event.endpoint, "/v1/vehicles");
        assert_eq!(event.source, "dashboard");
        assert_eq!(event.status, 404);
        assert_eq!(event.latency_ms, 12);
    }

    #[test]
    fn test_daily_key_derivation() {
        let event = UsageEvent::new(
            CredentialId::generate(),
            OrganizationId::generate(),
            "/v1/vehicles",
            "GET",
        );
        let key = event.daily_key();

        assert_eq!(key.organization_id, event.organization_id);
        assert_eq!(key.endpoint, "/v1/vehicles");
        assert_eq!(key.source, DEFAULT_SOURCE);
        assert_eq!(key.date, event.timestamp.date_naive());
    }
}
