//! Key material: generation and one-way hashing
//!
//! Keys are hashed with SHA-256 and stored as `sha256$<b64url>`. Hashing is
//! deterministic so the stored hash doubles as the lookup key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::credential::validation::visible_prefix;
use crate::domain::credential::Environment;

/// Number of random bytes behind each issued key
const KEY_BYTES: usize = 24;

/// Result of minting a new API key
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    /// The full key, shown exactly once at creation
    pub key: String,
    /// Display prefix stored alongside the hash
    pub prefix: String,
    /// Hash to store, `sha256$<b64url>`
    pub hash: String,
}

/// Hash a raw bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    format!("sha256${}", URL_SAFE_NO_PAD.encode(digest))
}

/// Mint a fresh key for the given environment.
pub fn generate_key(environment: Environment) -> GeneratedKey {
    let mut random_bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let opaque = URL_SAFE_NO_PAD.encode(random_bytes);
    from_secret(environment, &opaque)
}

/// Build key material from a known opaque portion. Used by tests that need
/// deterministic keys.
pub fn from_secret(environment: Environment, opaque: &str) -> GeneratedKey {
    let key = format!("cd_{}_{}", environment.as_str(), opaque);

    GeneratedKey {
        prefix: visible_prefix(&key),
        hash: hash_token(&key),
        key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let generated = generate_key(Environment::Live);

        assert!(generated.key.starts_with("cd_live_"));
        assert!(generated.prefix.starts_with("cd_live_"));
        assert!(generated.hash.starts_with("sha256$"));
        // 24 random bytes base64url-encoded is 32 chars of opaque material
        assert_eq!(generated.key.len(), "cd_live_".len() + 32);
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = generate_key(Environment::Test);
        let b = generate_key(Environment::Test);

        assert_ne!(a.key, b.key);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let token = "cd_test_abcdefghij0123456789";
        assert_eq!(hash_token(token), hash_token(token));
    }

    #[test]
    fn test_hash_differs_per_token() {
        assert_ne!(
            hash_token("cd_test_abcdefghij0123456789"),
            hash_token("cd_test_abcdefghij0123456788")
        );
    }

    #[test]
    fn test_from_secret_round_trips_hash() {
        let generated = from_secret(Environment::Test, "abcdefghij0123456789");
        assert_eq!(generated.key, "cd_test_abcdefghij0123456789");
        assert_eq!(generated.hash, hash_token(&generated.key));
        assert_eq!(generated.prefix, "cd_test_abc");
    }
}
