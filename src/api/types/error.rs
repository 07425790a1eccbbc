//! API error envelope
//!
//! Error codes are stable strings so programmatic clients can branch
//! without parsing messages; the message is a human-readable supplement,
//! not the contract. Rate-limit errors additionally carry a `Retry-After`
//! header mirroring the body's `retry_after`.

use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::auth::AuthError;

/// Error response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    code: code.into(),
                    message: message.into(),
                    retry_after: None,
                },
            },
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// Malformed VIN
    pub fn invalid_vin(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_vin", message)
    }

    /// Authentication error with a specific code
    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Decode succeeded but the local store has no matching rows
    pub fn no_local_data(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "no_local_data", message)
    }

    /// Method not allowed
    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "This API is read-only; only GET requests are supported",
        )
    }

    /// Rate limit error with a retry hint
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        let mut error = Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "Rate limit exceeded, slow down",
        );
        error.response.error.retry_after = Some(retry_after_secs);
        error
    }

    /// Monthly quota exhausted; resets with the next calendar month, so no
    /// retry hint is attached.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "quota_exceeded", message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = self.response.error.retry_after;
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = secs.to_string().parse() {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Registry { message } => Self::internal(message),
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Storage { message } => Self::internal(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Store(inner) => Self::internal(inner.to_string()),
            AuthError::QuotaExceeded => Self::quota_exceeded(err.to_string()),
            _ => Self::unauthorized(err.code(), err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.code, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
