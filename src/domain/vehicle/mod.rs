//! Vehicle domain model: record family, YMMT queries, VIN decoding seam

mod entity;
pub mod query;
mod repository;
mod vin;

pub use entity::{
    Condition, MaintenanceItem, MarketValue, Specification, VehicleId, WarrantyEntry,
};
pub use query::{SpecSearch, TrimFilter, VehicleQuery};
pub use repository::{
    VehicleRepository, MAINTENANCE_CAP, MARKET_VALUE_CAP, SPEC_SEARCH_CAP,
};
pub use vin::{DecodedVin, Vin, VinDecoder};
