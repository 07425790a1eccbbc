//! Credential repository implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryCredentialRepository;
pub use postgres::PostgresCredentialRepository;
