//! Success response envelope

use serde::Serialize;

/// Per-request metadata propagated from the auth middleware to handlers
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub request_id: String,
    /// Monthly requests consumed, counting this one
    pub tokens_used: u64,
    pub tokens_remaining: u64,
}

/// Metadata block of a success response
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub request_id: String,
    pub tokens_used: u64,
    pub tokens_remaining: u64,
}

/// `{data, meta}` envelope wrapping every success payload
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub meta: Meta,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T, meta: &RequestMeta) -> Self {
        Self {
            data,
            meta: Meta {
                request_id: meta.request_id.clone(),
                tokens_used: meta.tokens_used,
                tokens_remaining: meta.tokens_remaining,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let meta = RequestMeta {
            request_id: "req-1".to_string(),
            tokens_used: 42,
            tokens_remaining: 958,
        };
        let envelope = Envelope::new(serde_json::json!({"makes": ["Toyota"]}), &meta);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["data"]["makes"][0], "Toyota");
        assert_eq!(json["meta"]["request_id"], "req-1");
        assert_eq!(json["meta"]["tokens_used"], 42);
        assert_eq!(json["meta"]["tokens_remaining"], 958);
    }
}
