//! PostgreSQL credential repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::credential::{ApiCredential, CredentialId, CredentialRepository, Environment};
use crate::domain::organization::{Organization, OrganizationId, SubscriptionStatus, Tier};
use crate::domain::DomainError;

/// PostgreSQL implementation of CredentialRepository
#[derive(Debug, Clone)]
pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiCredential>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, key_hash, key_prefix, organization_id, environment,
                   active, expires_at, created_at, last_used_at
            FROM api_credentials
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up credential: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_credential(&row)?)),
            None => Ok(None),
        }
    }

    async fn organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT o.id, o.name, o.subscription_status,
                   t.name AS tier_name, t.requests_per_minute, t.monthly_limit
            FROM organizations o
            JOIN tiers t ON t.id = o.tier_id
            WHERE o.id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load organization: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_organization(&row)?)),
            None => Ok(None),
        }
    }

    async fn touch_last_used(&self, id: CredentialId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE api_credentials
            SET last_used_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update last-used: {}", e)))?;

        Ok(())
    }
}

fn row_to_credential(row: &sqlx::postgres::PgRow) -> Result<ApiCredential, DomainError> {
    let id: Uuid = row.get("id");
    let organization_id: Uuid = row.get("organization_id");
    let environment: String = row.get("environment");

    let environment = match environment.as_str() {
        "live" => Environment::Live,
        "test" => Environment::Test,
        other => {
            return Err(DomainError::storage(format!(
                "Unknown credential environment '{}'",
                other
            )))
        }
    };

    Ok(ApiCredential::from_parts(
        CredentialId::new(id),
        row.get("key_hash"),
        row.get("key_prefix"),
        OrganizationId::new(organization_id),
        environment,
        row.get("active"),
        row.get("expires_at"),
        row.get("created_at"),
        row.get("last_used_at"),
    ))
}

fn row_to_organization(row: &sqlx::postgres::PgRow) -> Result<Organization, DomainError> {
    let id: Uuid = row.get("id");
    let name: String = row.get("name");
    let status: String = row.get("subscription_status");
    let tier_name: String = row.get("tier_name");
    let requests_per_minute: i32 = row.get("requests_per_minute");
    let monthly_limit: i64 = row.get("monthly_limit");

    let tier = Tier::new(
        tier_name,
        u32::try_from(requests_per_minute)
            .map_err(|_| DomainError::storage("Negative tier rate limit in store"))?,
        u64::try_from(monthly_limit)
            .map_err(|_| DomainError::storage("Negative tier monthly limit in store"))?,
    )
    .map_err(|e| DomainError::storage(format!("Invalid stored tier: {}", e)))?;

    Ok(
        Organization::new(OrganizationId::new(id), name, tier)
            .with_subscription_status(SubscriptionStatus::parse(&status)?),
    )
}
