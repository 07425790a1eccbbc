//! Vehicle lookup endpoint handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Envelope, RequestMeta};
use crate::api::v1::params::{parse_i32, parse_opt_i32, require};
use crate::domain::vehicle::{Condition, Specification, VehicleId, VehicleQuery};
use crate::infrastructure::vehicle::{LookupOptions, VehicleReport};

#[derive(Debug, Deserialize, Default)]
pub struct LookupParams {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub condition: Option<String>,
    pub mileage: Option<String>,
    pub current_mileage: Option<String>,
}

impl LookupParams {
    pub(crate) fn options(&self) -> Result<LookupOptions, ApiError> {
        let condition = self
            .condition
            .as_deref()
            .map(Condition::parse)
            .transpose()?;

        Ok(LookupOptions {
            trim: self.trim.clone().filter(|t| !t.trim().is_empty()),
            condition,
            mileage: parse_opt_i32(self.mileage.as_deref(), "mileage")?,
            current_mileage: parse_opt_i32(self.current_mileage.as_deref(), "current_mileage")?,
        })
    }
}

/// GET /v1/vehicles
pub async fn lookup_vehicle(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Envelope<VehicleReport>>, ApiError> {
    let year = parse_i32(require(params.year.as_deref(), "year")?, "year")?;
    let make = require(params.make.as_deref(), "make")?;
    let model = require(params.model.as_deref(), "model")?;

    debug!(year, make, model, trim = ?params.trim, "Vehicle lookup");

    let query = VehicleQuery::new(year, make, model);
    let options = params.options()?;

    let report = state.resolver.lookup(&query, &options).await?;

    Ok(Json(Envelope::new(report, &meta)))
}

/// Resolve a path id to its specification, 404 when unknown
async fn spec_for_id(state: &AppState, id: &str) -> Result<Specification, ApiError> {
    let id = id
        .parse::<Uuid>()
        .map_err(|_| ApiError::bad_request(format!("Invalid vehicle id '{}'", id)))?;

    state
        .vehicles
        .specification_by_id(VehicleId::new(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Vehicle '{}' not found", id)))
}

fn options_for_spec(spec: &Specification, base: LookupOptions) -> (VehicleQuery, LookupOptions) {
    let query = VehicleQuery::new(spec.year, spec.make.clone(), spec.model.clone());
    let options = LookupOptions {
        trim: spec.trim.clone(),
        ..base
    };

    (query, options)
}

/// GET /v1/vehicles/{id}/warranty
pub async fn warranty_by_id(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let spec = spec_for_id(&state, &id).await?;
    let (query, options) = options_for_spec(&spec, LookupOptions::default());

    let warranty = state.resolver.warranty(&query, &options).await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "warranty": warranty }),
        &meta,
    )))
}

/// GET /v1/vehicles/{id}/market-value
pub async fn market_value_by_id(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let spec = spec_for_id(&state, &id).await?;
    let (query, options) = options_for_spec(&spec, params.options()?);

    let values = state.resolver.market_values(&query, &options).await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "market_values": values }),
        &meta,
    )))
}

/// GET /v1/vehicles/{id}/maintenance
pub async fn maintenance_by_id(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let spec = spec_for_id(&state, &id).await?;
    let (query, options) = options_for_spec(&spec, params.options()?);

    let maintenance = state.resolver.maintenance(&query, &options).await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "maintenance": maintenance }),
        &meta,
    )))
}
