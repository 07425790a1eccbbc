//! Bearer token format validation
//!
//! Every issued key looks like `cd_live_...` or `cd_test_...`. The format is
//! checked before any store access so malformed tokens fail fast and never
//! cost a lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::Environment;

/// Keys carry at least 16 characters of opaque material after the prefix.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cd_(live|test)_[A-Za-z0-9_-]{16,}$").unwrap());

/// Number of leading characters safe to show in UIs and logs
pub const VISIBLE_PREFIX_LEN: usize = 11;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenFormatError {
    #[error("API key does not match the expected format")]
    Malformed,
}

/// Validate the raw token shape and extract its environment tag.
pub fn parse_token(token: &str) -> Result<Environment, TokenFormatError> {
    let captures = TOKEN_PATTERN
        .captures(token)
        .ok_or(TokenFormatError::Malformed)?;

    match &captures[1] {
        "live" => Ok(Environment::Live),
        _ => Ok(Environment::Test),
    }
}

/// The short prefix of a token used for display and log correlation.
/// Never logs enough of the key to reconstruct it.
pub fn visible_prefix(token: &str) -> String {
    token.chars().take(VISIBLE_PREFIX_LEN).collect()
}
