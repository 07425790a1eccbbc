//! Infrastructure layer: concrete backends for the domain's seams

pub mod auth;
pub mod credential;
pub mod logging;
pub mod rate_limit;
pub mod usage;
pub mod vehicle;
pub mod vin;
