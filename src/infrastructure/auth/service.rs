//! Credential validation service
//!
//! Turns a raw bearer token into an authenticated principal, or a specific
//! rejection. Store faults are kept distinct from authentication failures:
//! an unreachable credential store is a reliability signal, not an invalid
//! key.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::credential::{
    parse_token, visible_prefix, CredentialId, CredentialRepository, Environment,
};
use crate::domain::organization::OrganizationId;
use crate::domain::usage::UsageRepository;
use crate::domain::DomainError;

use super::token::hash_token;

/// Authenticated principal attached to a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub credential_id: CredentialId,
    pub organization_id: OrganizationId,
    pub environment: Environment,
    pub requests_per_minute: u32,
    pub monthly_limit: u64,
    pub monthly_used: u64,
}

impl AuthContext {
    /// Requests left in the current month, after this one
    pub fn tokens_remaining(&self) -> u64 {
        self.monthly_limit
            .saturating_sub(self.monthly_used)
            .saturating_sub(1)
    }
}

/// Authentication failures, each with a stable user-facing code
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("API key required. Provide via 'Authorization: Bearer <key>' header")]
    MissingKey,

    #[error("API key does not match the expected format")]
    InvalidFormat,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("API key has been disabled")]
    KeyDisabled,

    #[error("API key has expired")]
    KeyExpired,

    #[error("Subscription is not active")]
    SubscriptionInactive,

    #[error("Monthly request quota exceeded")]
    QuotaExceeded,

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingKey => "missing_key",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidKey => "invalid_key",
            Self::KeyDisabled => "key_disabled",
            Self::KeyExpired => "key_expired",
            Self::SubscriptionInactive => "subscription_inactive",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Store(_) => "internal_error",
        }
    }
}

/// Credential validator
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialRepository>,
    usage: Arc<dyn UsageRepository>,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        usage: Arc<dyn UsageRepository>,
    ) -> Self {
        Self { credentials, usage }
    }

    /// Validate a raw bearer token.
    ///
    /// Failure states are tested in priority order: format, existence,
    /// active flag, expiry, subscription standing, monthly quota.
    pub async fn authenticate(&self, raw_token: &str) -> Result<AuthContext, AuthError> {
        parse_token(raw_token).map_err(|_| AuthError::InvalidFormat)?;

        debug!(key_prefix = %visible_prefix(raw_token), "Validating API key");

        let key_hash = hash_token(raw_token);

        let credential = self
            .credentials
            .find_by_hash(&key_hash)
            .await?
            .ok_or(AuthError::InvalidKey)?;

        if !credential.is_active() {
            return Err(AuthError::KeyDisabled);
        }

        if credential.is_expired() {
            return Err(AuthError::KeyExpired);
        }

        let organization = self
            .credentials
            .organization(credential.organization_id())
            .await?
            .ok_or_else(|| {
                AuthError::Store(DomainError::storage(format!(
                    "Credential {} references missing organization",
                    credential.id()
                )))
            })?;

        if !organization.subscription_status().in_good_standing() {
            return Err(AuthError::SubscriptionInactive);
        }

        let monthly_used = self
            .usage
            .monthly_requests(organization.id(), Utc::now())
            .await?;

        let tier = organization.tier();

        if monthly_used >= tier.monthly_limit() {
            return Err(AuthError::QuotaExceeded);
        }

        // Best-effort, off the critical path.
        let credentials = Arc::clone(&self.credentials);
        let credential_id = credential.id();
        tokio::spawn(async move {
            if let Err(e) = credentials.touch_last_used(credential_id).await {
                warn!(credential_id = %credential_id, "Failed to update last-used timestamp: {}", e);
            }
        });

        Ok(AuthContext {
            credential_id: credential.id(),
            organization_id: organization.id(),
            environment: credential.environment(),
            requests_per_minute: tier.requests_per_minute(),
            monthly_limit: tier.monthly_limit(),
            monthly_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::organization::{Organization, SubscriptionStatus, Tier};
    use crate::domain::usage::UsageEvent;
    use crate::infrastructure::auth::token::from_secret;
    use crate::infrastructure::credential::InMemoryCredentialRepository;
    use crate::infrastructure::usage::InMemoryUsageRepository;
    use crate::domain::credential::ApiCredential;

    const SECRET: &str = "abcdefghij0123456789";

    struct Fixture {
        service: AuthService,
        credentials: Arc<InMemoryCredentialRepository>,
        usage: Arc<InMemoryUsageRepository>,
        organization_id: OrganizationId,
        credential_id: CredentialId,
        token: String,
    }

    async fn fixture(tier: Tier, status: SubscriptionStatus) -> Fixture {
        let credentials = Arc::new(InMemoryCredentialRepository::new());
        let usage = Arc::new(InMemoryUsageRepository::new());

        let organization_id = OrganizationId::generate();
        let organization = Organization::new(organization_id, "Acme Motors", tier)
            .with_subscription_status(status);
        credentials.insert_organization(organization).await;

        let generated = from_secret(Environment::Test, SECRET);
        let credential_id = CredentialId::generate();
        let credential = ApiCredential::new(
            credential_id,
            &generated.hash,
            &generated.prefix,
            organization_id,
            Environment::Test,
        );
        credentials.insert_credential(credential).await;

        let service = AuthService::new(credentials.clone(), usage.clone());

        Fixture {
            service,
            credentials,
            usage,
            organization_id,
            credential_id,
            token: generated.key,
        }
    }

    fn default_tier() -> Tier {
        Tier::new("pro", 60, 1000).unwrap()
    }

    #[tokio::test]
    async fn test_valid_key_authenticates() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;

        let ctx = f.service.authenticate(&f.token).await.unwrap();

        assert_eq!(ctx.organization_id, f.organization_id);
        assert_eq!(ctx.credential_id, f.credential_id);
        assert_eq!(ctx.requests_per_minute, 60);
        assert_eq!(ctx.monthly_limit, 1000);
        assert_eq!(ctx.monthly_used, 0);
        assert_eq!(ctx.tokens_remaining(), 999);
    }

    #[tokio::test]
    async fn test_malformed_key_fails_fast() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;

        let err = f.service.authenticate("not-a-key").await.unwrap_err();
        assert_eq!(err.code(), "invalid_format");
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;

        let other = from_secret(Environment::Test, "zzzzzzzzzzzzzzzzzzzz");
        let err = f.service.authenticate(&other.key).await.unwrap_err();
        assert_eq!(err.code(), "invalid_key");
    }

    #[tokio::test]
    async fn test_disabled_key() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;
        f.credentials.disable_credential(f.credential_id).await;

        let err = f.service.authenticate(&f.token).await.unwrap_err();
        assert_eq!(err.code(), "key_disabled");
    }

    #[tokio::test]
    async fn test_expired_key() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;
        f.credentials
            .expire_credential(f.credential_id, Utc::now() - chrono::Duration::hours(1))
            .await;

        let err = f.service.authenticate(&f.token).await.unwrap_err();
        assert_eq!(err.code(), "key_expired");
    }

    #[tokio::test]
    async fn test_inactive_subscription() {
        let f = fixture(default_tier(), SubscriptionStatus::PastDue).await;

        let err = f.service.authenticate(&f.token).await.unwrap_err();
        assert_eq!(err.code(), "subscription_inactive");
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let tier = Tier::new("starter", 60, 2).unwrap();
        let f = fixture(tier, SubscriptionStatus::Active).await;

        for _ in 0..2 {
            let event = UsageEvent::new(
                f.credential_id,
                f.organization_id,
                "/v1/vehicles",
                "GET",
            );
            f.usage.insert_event(&event).await.unwrap();
        }

        let err = f.service.authenticate(&f.token).await.unwrap_err();
        assert_eq!(err.code(), "quota_exceeded");
    }

    #[tokio::test]
    async fn test_store_fault_is_not_invalid_key() {
        let f = fixture(default_tier(), SubscriptionStatus::Active).await;
        f.credentials.set_should_fail(true).await;

        let err = f.service.authenticate(&f.token).await.unwrap_err();
        assert_eq!(err.code(), "internal_error");
        assert!(matches!(err, AuthError::Store(_)));
    }
}
