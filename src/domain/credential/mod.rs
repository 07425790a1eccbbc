//! API credential domain model

mod entity;
mod repository;
pub mod validation;

pub use entity::{ApiCredential, CredentialId, Environment};
pub use repository::CredentialRepository;
pub use validation::{parse_token, visible_prefix, TokenFormatError};
