//! In-memory credential repository
//!
//! Backs single-process deployments and tests. Holds credentials keyed by
//! hash plus the organizations that own them, and can be flipped into a
//! failing mode to exercise store-fault paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::credential::{ApiCredential, CredentialId, CredentialRepository};
use crate::domain::organization::{Organization, OrganizationId};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    /// Keyed by key hash, the primary lookup
    credentials: Arc<RwLock<HashMap<String, ApiCredential>>>,
    organizations: Arc<RwLock<HashMap<OrganizationId, Organization>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_credential(&self, credential: ApiCredential) {
        let mut credentials = self.credentials.write().await;
        credentials.insert(credential.key_hash().to_string(), credential);
    }

    pub async fn insert_organization(&self, organization: Organization) {
        let mut organizations = self.organizations.write().await;
        organizations.insert(organization.id(), organization);
    }

    pub async fn disable_credential(&self, id: CredentialId) {
        let mut credentials = self.credentials.write().await;
        if let Some(credential) = credentials.values_mut().find(|c| c.id() == id) {
            credential.disable();
        }
    }

    pub async fn expire_credential(&self, id: CredentialId, expires_at: DateTime<Utc>) {
        let mut credentials = self.credentials.write().await;
        if let Some(credential) = credentials.values_mut().find(|c| c.id() == id) {
            let updated = credential.clone().with_expiration(expires_at);
            *credential = updated;
        }
    }

    /// Make every operation fail, to simulate a store outage
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Credential store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiCredential>, DomainError> {
        self.check_should_fail().await?;
        let credentials = self.credentials.read().await;
        Ok(credentials.get(key_hash).cloned())
    }

    async fn organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, DomainError> {
        self.check_should_fail().await?;
        let organizations = self.organizations.read().await;
        Ok(organizations.get(&id).cloned())
    }

    async fn touch_last_used(&self, id: CredentialId) -> Result<(), DomainError> {
        self.check_should_fail().await?;
        let mut credentials = self.credentials.write().await;

        match credentials.values_mut().find(|c| c.id() == id) {
            Some(credential) => {
                credential.record_usage();
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "Credential '{}' not found",
                id
            ))),
        }
    }
}
