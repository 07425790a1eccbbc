//! API credential entity
//!
//! A credential is the stored side of a bearer key: the one-way hash used for
//! lookup, the visible prefix used for display, and the flags that gate its
//! use. The raw secret is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::organization::OrganizationId;

/// Credential identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(Uuid);

impl CredentialId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Environment tag carried inside every issued key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Live,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }
}

/// API credential entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCredential {
    id: CredentialId,
    /// One-way hash of the full key, format `sha256$<b64url>`. Primary lookup key.
    key_hash: String,
    /// Visible prefix kept for display, e.g. `cd_live_abc`
    key_prefix: String,
    organization_id: OrganizationId,
    environment: Environment,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used_at: Option<DateTime<Utc>>,
}

impl ApiCredential {
    pub fn new(
        id: CredentialId,
        key_hash: impl Into<String>,
        key_prefix: impl Into<String>,
        organization_id: OrganizationId,
        environment: Environment,
    ) -> Self {
        Self {
            id,
            key_hash: key_hash.into(),
            key_prefix: key_prefix.into(),
            organization_id,
            environment,
            active: true,
            expires_at: None,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn id(&self) -> CredentialId {
        self.id
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Soft-revoke the credential. Credentials are never physically deleted.
    pub fn disable(&mut self) {
        self.active = false;
    }

    pub fn record_usage(&mut self) {
        self.last_used_at = Some(Utc::now());
    }

    /// Rehydrate a credential from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: CredentialId,
        key_hash: String,
        key_prefix: String,
        organization_id: OrganizationId,
        environment: Environment,
        active: bool,
        expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        last_used_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            key_hash,
            key_prefix,
            organization_id,
            environment,
            active,
            expires_at,
            created_at,
            last_used_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_credential() -> ApiCredential {
        ApiCredential::new(
            CredentialId::generate(),
            "sha256$deadbeef",
            "cd_test_abc",
            OrganizationId::generate(),
            Environment::Test,
        )
    }

    #[test]
    fn test_new_credential_is_active() {
        let credential = test_credential();
        assert!(credential.is_active());
        assert!(!credential.is_expired());
        assert!(credential.last_used_at().is_none());
    }

    #[test]
    fn test_disable_is_soft() {
        let mut credential = test_credential();
        credential.disable();
        assert!(!credential.is_active());
        // The hash stays in place so the row can still be found and reported
        // as disabled rather than unknown.
        assert_eq!(credential.key_hash(), "sha256$deadbeef");
    }

    #[test]
    fn test_expiry() {
        let credential = test_credential().with_expiration(Utc::now() - Duration::hours(1));
        assert!(credential.is_expired());

        let credential = test_credential().with_expiration(Utc::now() + Duration::hours(1));
        assert!(!credential.is_expired());
    }

    #[test]
    fn test_record_usage() {
        let mut credential = test_credential();
        credential.record_usage();
        assert!(credential.last_used_at().is_some());
    }
}
