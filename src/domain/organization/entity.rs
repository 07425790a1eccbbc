//! Organization entity - the billing and quota identity behind every credential

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Organization identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(Uuid);

impl OrganizationId {
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

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Billing state of an organization's subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Whether the subscription entitles the organization to serve requests
    pub fn in_good_standing(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            other => Err(DomainError::storage(format!(
                "Unknown subscription status '{}'",
                other
            ))),
        }
    }
}

/// A named subscription level defining the rate limit and monthly quota.
///
/// Limits are validated at construction time so a misconfigured tier is
/// rejected before it ever reaches the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    name: String,
    requests_per_minute: u32,
    monthly_limit: u64,
}

impl Tier {
    pub fn new(
        name: impl Into<String>,
        requests_per_minute: u32,
        monthly_limit: u64,
    ) -> Result<Self, DomainError> {
        let name = name.into();

        if name.is_empty() {
            return Err(DomainError::validation("Tier name must not be empty"));
        }

        if requests_per_minute == 0 {
            return Err(DomainError::validation(
                "Tier rate limit must be a positive number of requests per minute",
            ));
        }

        if monthly_limit == 0 {
            return Err(DomainError::validation(
                "Tier monthly quota must be positive",
            ));
        }

        Ok(Self {
            name,
            requests_per_minute,
            monthly_limit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    pub fn monthly_limit(&self) -> u64 {
        self.monthly_limit
    }
}

/// Organization entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    id: OrganizationId,
    name: String,
    tier: Tier,
    subscription_status: SubscriptionStatus,
}

impl Organization {
    pub fn new(id: OrganizationId, name: impl Into<String>, tier: Tier) -> Self {
        Self {
            id,
            name: name.into(),
            tier,
            subscription_status: SubscriptionStatus::Active,
        }
    }

    pub fn with_subscription_status(mut self, status: SubscriptionStatus) -> Self {
        self.subscription_status = status;
        self
    }

    pub fn id(&self) -> OrganizationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> &Tier {
        &self.tier
    }

    pub fn subscription_status(&self) -> SubscriptionStatus {
        self.subscription_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_rejects_zero_rate_limit() {
        assert!(Tier::new("free", 0, 1000).is_err());
    }

    #[test]
    fn test_tier_rejects_zero_monthly_quota() {
        assert!(Tier::new("free", 60, 0).is_err());
    }

    #[test]
    fn test_tier_valid() {
        let tier = Tier::new("pro", 120, 50_000).unwrap();
        assert_eq!(tier.name(), "pro");
        assert_eq!(tier.requests_per_minute(), 120);
        assert_eq!(tier.monthly_limit(), 50_000);
    }

    #[test]
    fn test_subscription_standing() {
        assert!(SubscriptionStatus::Active.in_good_standing());
        assert!(SubscriptionStatus::Trialing.in_good_standing());
        assert!(!SubscriptionStatus::PastDue.in_good_standing());
        assert!(!SubscriptionStatus::Canceled.in_good_standing());
    }

    #[test]
    fn test_subscription_status_round_trip() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            assert_eq!(SubscriptionStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(SubscriptionStatus::parse("bogus").is_err());
    }

    #[test]
    fn test_organization_defaults_to_active() {
        let tier = Tier::new("free", 60, 1000).unwrap();
        let org = Organization::new(OrganizationId::generate(), "Acme Motors", tier);
        assert_eq!(org.subscription_status(), SubscriptionStatus::Active);
    }
}
