//! PostgreSQL usage repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::credential::CredentialId;
use crate::domain::organization::OrganizationId;
use crate::domain::usage::{DailyUsageKey, UsageEvent, UsageRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UsageRepository
#[derive(Debug, Clone)]
pub struct PostgresUsageRepository {
    pool: PgPool,
}

impl PostgresUsageRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepository {
    async fn insert_event(&self, event: &UsageEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO usage_events (id, credential_id, organization_id, endpoint,
                                      method, source, status, latency_ms, created_at, params)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.id)
        .bind(event.credential_id.as_uuid())
        .bind(event.organization_id.as_uuid())
        .bind(&event.endpoint)
        .bind(&event.method)
        .bind(&event.source)
        .bind(event.status as i32)
        .bind(event.latency_ms as i64)
        .bind(event.timestamp)
        .bind(&event.params)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert usage event: {}", e)))?;

        Ok(())
    }

    async fn increment_daily(
        &self,
        key: &DailyUsageKey,
        requests: u64,
        tokens: u64,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO usage_daily (organization_id, date, source, endpoint, requests, tokens)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (organization_id, date, source, endpoint)
            DO UPDATE SET requests = usage_daily.requests + EXCLUDED.requests,
                          tokens = usage_daily.tokens + EXCLUDED.tokens
            "#,
        )
        .bind(key.organization_id.as_uuid())
        .bind(key.date)
        .bind(&key.source)
        .bind(&key.endpoint)
        .bind(requests as i64)
        .bind(tokens as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to increment daily usage: {}", e)))?;

        Ok(())
    }

    async fn monthly_requests(
        &self,
        organization_id: OrganizationId,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM usage_events
            WHERE organization_id = $1
              AND created_at >= date_trunc('month', $2::timestamptz)
              AND created_at < date_trunc('month', $2::timestamptz) + interval '1 month'
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count monthly requests: {}", e)))?;

        Ok(count as u64)
    }

    async fn events_in_period(
        &self,
        organization_id: OrganizationId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UsageEvent>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, credential_id, organization_id, endpoint, method, source,
                   status, latency_ms, created_at, params
            FROM usage_events
            WHERE organization_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list usage events: {}", e)))?;

        Ok(rows.iter().map(row_to_event).collect())
    }
}

fn row_to_event(row: &sqlx::postgres::PgRow) -> UsageEvent {
    UsageEvent {
        id: row.get("id"),
        credential_id: CredentialId::new(row.get::<Uuid, _>("credential_id")),
        organization_id: OrganizationId::new(row.get::<Uuid, _>("organization_id")),
        endpoint: row.get("endpoint"),
        method: row.get("method"),
        source: row.get("source"),
        status: row.get::<i32, _>("status") as u16,
        latency_ms: row.get::<i64, _>("latency_ms") as u64,
        timestamp: row.get("created_at"),
        params: row.get("params"),
    }
}
