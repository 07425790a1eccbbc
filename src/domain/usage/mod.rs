//! Usage accounting domain model

mod event;
mod repository;

pub use event::{DailyUsage, DailyUsageKey, UsageEvent, DEFAULT_SOURCE};
pub use repository::UsageRepository;
