//! Usage tracking layer
//!
//! Sits inside the auth gate, so it only ever sees requests that passed
//! both credential validation and the rate window. The event is dispatched
//! after the response is fully determined; the recorded status always
//! equals the returned status, and recording can never change either.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::middleware::auth::RequestStart;
use crate::api::state::AppState;
use crate::domain::usage::{UsageEvent, DEFAULT_SOURCE};
use crate::infrastructure::auth::AuthContext;

pub async fn track_usage(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(context) = request.extensions().get::<AuthContext>().cloned() else {
        // No principal attached means the gate did not run for this route.
        return next.run(request).await;
    };

    let start = request
        .extensions()
        .get::<RequestStart>()
        .map(|s| s.0)
        .unwrap_or_else(Instant::now);

    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let method = request.method().to_string();

    let source = request
        .headers()
        .get("x-source")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SOURCE)
        .to_string();

    let params = request
        .uri()
        .query()
        .map(|q| serde_json::json!({ "query": q }));

    let response = next.run(request).await;

    let mut event = UsageEvent::new(
        context.credential_id,
        context.organization_id,
        endpoint,
        method,
    )
    .with_source(source)
    .with_status(response.status().as_u16())
    .with_latency_ms(start.elapsed().as_millis() as u64);

    if let Some(params) = params {
        event = event.with_params(params);
    }

    state.recorder.record(event);

    response
}
