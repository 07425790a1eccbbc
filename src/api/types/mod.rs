//! Shared API wire types

mod envelope;
mod error;

pub use envelope::{Envelope, Meta, RequestMeta};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse};
