//! Credential repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiCredential, CredentialId};
use crate::domain::organization::{Organization, OrganizationId};
use crate::domain::DomainError;

/// Repository trait for credential and organization lookups.
///
/// Credentials are looked up by key hash only, never by scanning raw
/// secrets. Organizations ride along because the validator needs the tier
/// and subscription status of whichever organization owns the credential.
#[async_trait]
pub trait CredentialRepository: Send + Sync + Debug {
    /// Find a credential by the hash of its raw key.
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiCredential>, DomainError>;

    /// Load the organization owning a credential.
    async fn organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, DomainError>;

    /// Update the last-used timestamp on a credential. Best-effort: callers
    /// may dispatch this off the critical path.
    async fn touch_last_used(&self, id: CredentialId) -> Result<(), DomainError>;
}
