//! Request middleware

pub mod auth;
pub mod usage;

pub use auth::require_auth;
pub use usage::track_usage;
