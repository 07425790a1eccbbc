use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{require_auth, track_usage};
use super::state::AppState;
use super::types::ApiError;
use super::v1;

/// Create the full router with application state.
///
/// Every `/v1` route sits behind the auth gate with the usage layer nested
/// inside it, so only requests that pass both gates are recorded. The API
/// is read-only: non-GET methods get a 405 in the standard error envelope.
pub fn create_router(state: AppState) -> Router {
    let metered = Router::new()
        .route("/vehicles", get(v1::vehicles::lookup_vehicle))
        .route("/vehicles/{id}/warranty", get(v1::vehicles::warranty_by_id))
        .route(
            "/vehicles/{id}/market-value",
            get(v1::vehicles::market_value_by_id),
        )
        .route(
            "/vehicles/{id}/maintenance",
            get(v1::vehicles::maintenance_by_id),
        )
        .route("/vin/{vin}", get(v1::vin::decode_vin))
        .route("/vin/{vin}/full", get(v1::vin::lookup_by_vin))
        .route("/specs", get(v1::specs::search_specs))
        .route("/specs/{id}", get(v1::specs::get_spec))
        .route("/makes", get(v1::catalog::list_makes))
        .route("/models", get(v1::catalog::list_models))
        .route("/trims", get(v1::catalog::list_trims))
        .layer(middleware::from_fn_with_state(state.clone(), track_usage))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", metered)
        .method_not_allowed_fallback(|| async { ApiError::method_not_allowed() })
        .fallback(|| async { ApiError::not_found("Route not found") })
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
