//! Vehicle repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Condition, MaintenanceItem, MarketValue, Specification, VehicleId, WarrantyEntry};
use super::query::{SpecSearch, TrimFilter, VehicleQuery};
use crate::domain::DomainError;

/// Cap on market-value rows returned by a single lookup
pub const MARKET_VALUE_CAP: usize = 20;
/// Cap on maintenance rows returned by a single lookup
pub const MAINTENANCE_CAP: usize = 50;
/// Cap on specs search results
pub const SPEC_SEARCH_CAP: usize = 50;

/// Read-only access to the vehicle record family.
///
/// Implementations must apply the matching rules from
/// [`crate::domain::vehicle::query`]: case-insensitive make/model,
/// hyphen/space-equivalent model names, prefix trim filters. Results are
/// returned in a deterministic order (insertion order for ties) so repeated
/// identical queries are byte-identical.
#[async_trait]
pub trait VehicleRepository: Send + Sync + Debug {
    /// First specification matching the query and trim filter, if any.
    async fn find_specification(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Option<Specification>, DomainError>;

    async fn specification_by_id(
        &self,
        id: VehicleId,
    ) -> Result<Option<Specification>, DomainError>;

    async fn search_specifications(
        &self,
        search: &SpecSearch,
        limit: usize,
    ) -> Result<Vec<Specification>, DomainError>;

    async fn find_warranty(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Vec<WarrantyEntry>, DomainError>;

    async fn find_market_values(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        condition: Option<Condition>,
        limit: usize,
    ) -> Result<Vec<MarketValue>, DomainError>;

    /// Maintenance entries ordered by ascending mileage.
    async fn find_maintenance(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        limit: usize,
    ) -> Result<Vec<MaintenanceItem>, DomainError>;

    async fn list_makes(&self, year: Option<i32>) -> Result<Vec<String>, DomainError>;

    async fn list_models(
        &self,
        make: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError>;

    async fn list_trims(
        &self,
        make: Option<&str>,
        model: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError>;
}
