//! Usage accounting infrastructure

mod in_memory;
mod postgres;
mod recorder;

pub use in_memory::InMemoryUsageRepository;
pub use postgres::PostgresUsageRepository;
pub use recorder::UsageRecorder;
