//! Vehicle data infrastructure: lookup resolver and repository backends

mod in_memory;
mod postgres;
mod resolver;

pub use in_memory::InMemoryVehicleRepository;
pub use postgres::PostgresVehicleRepository;
pub use resolver::{
    mileage_adjustment_cents, LookupOptions, LookupResolver, VehicleReport, VinReport,
};
