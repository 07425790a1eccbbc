//! Authentication and rate-limit gate
//!
//! Runs before every metered route, in strict order: credential validation
//! first, then the per-organization rate window. A request rejected at
//! either gate never reaches a handler and is not recorded as usage. On
//! success the authenticated principal and per-request metadata are
//! attached as extensions for the handlers and the usage layer.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, RequestMeta};
use crate::infrastructure::auth::AuthError;
use crate::infrastructure::rate_limit::RateDecision;

/// Wall-clock start of the request, for latency accounting
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let token = extract_bearer_token(request.headers())?;
    let context = state.auth.authenticate(&token).await?;

    match state
        .rate_limiter
        .hit(context.organization_id, context.requests_per_minute)
        .await
    {
        RateDecision::Allowed { .. } => {}
        RateDecision::Denied { retry_after_secs } => {
            return Err(ApiError::rate_limited(retry_after_secs));
        }
    }

    let meta = RequestMeta {
        request_id: request_id(&request),
        tokens_used: context.monthly_used + 1,
        tokens_remaining: context.tokens_remaining(),
    };

    request.extensions_mut().insert(RequestStart(start));
    request.extensions_mut().insert(context);
    request.extensions_mut().insert(meta);

    Ok(next.run(request).await)
}

fn request_id(request: &Request) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::from(AuthError::MissingKey))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::from(AuthError::MissingKey))?;

    Ok(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer cd_test_abcdefghij0123456789".parse().unwrap(),
        );

        let token = extract_bearer_token(&headers).unwrap();
        assert_eq!(token, "cd_test_abcdefghij0123456789");
    }

    #[test]
    fn test_missing_header_is_missing_key() {
        let headers = HeaderMap::new();
        let err = extract_bearer_token(&headers).unwrap_err();

        assert_eq!(err.response.error.code, "missing_key");
    }

    #[test]
    fn test_non_bearer_scheme_is_missing_key() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.response.error.code, "missing_key");
    }
}
