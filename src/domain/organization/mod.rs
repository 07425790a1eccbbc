//! Organization domain model

mod entity;

pub use entity::{Organization, OrganizationId, SubscriptionStatus, Tier};
