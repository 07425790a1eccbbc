//! Specification endpoint handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Envelope, RequestMeta};
use crate::api::v1::params::parse_opt_i32;
use crate::domain::vehicle::{SpecSearch, Specification, VehicleId, SPEC_SEARCH_CAP};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
}

/// GET /v1/specs
pub async fn search_specs(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let search = SpecSearch {
        year: parse_opt_i32(params.year.as_deref(), "year")?,
        make: params.make.clone().filter(|v| !v.trim().is_empty()),
        model: params.model.clone().filter(|v| !v.trim().is_empty()),
        trim: params.trim.clone().filter(|v| !v.trim().is_empty()),
    };

    debug!(?search, "Searching specifications");

    let specs = state
        .vehicles
        .search_specifications(&search, SPEC_SEARCH_CAP)
        .await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "specs": specs }),
        &meta,
    )))
}

/// GET /v1/specs/{id}
pub async fn get_spec(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Specification>>, ApiError> {
    let id = id
        .parse::<Uuid>()
        .map_err(|_| ApiError::bad_request(format!("Invalid specification id '{}'", id)))?;

    let spec = state
        .vehicles
        .specification_by_id(VehicleId::new(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Specification '{}' not found", id)))?;

    Ok(Json(Envelope::new(spec, &meta)))
}
