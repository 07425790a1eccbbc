//! Domain layer: entities, repository traits and core errors

pub mod credential;
mod error;
pub mod organization;
pub mod usage;
pub mod vehicle;

pub use error::DomainError;
