//! Credential validation: token hashing and the authentication service

mod service;
pub mod token;

pub use service::{AuthContext, AuthError, AuthService};
pub use token::{generate_key, hash_token, GeneratedKey};
