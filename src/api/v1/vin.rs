//! VIN endpoint handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Envelope, RequestMeta};
use crate::api::v1::vehicles::LookupParams;
use crate::domain::vehicle::{DecodedVin, Vin};
use crate::domain::DomainError;
use crate::infrastructure::vehicle::VinReport;

fn parse_vin(raw: &str) -> Result<Vin, ApiError> {
    Vin::new(raw).map_err(|err| match err {
        DomainError::Validation { message } => ApiError::invalid_vin(message),
        other => other.into(),
    })
}

/// GET /v1/vin/{vin}
pub async fn decode_vin(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(vin): Path<String>,
) -> Result<Json<Envelope<DecodedVin>>, ApiError> {
    let vin = parse_vin(&vin)?;

    debug!(vin = %vin, "Decoding VIN");

    let decoded = state.resolver.decode_vin(&vin).await?;

    Ok(Json(Envelope::new(decoded, &meta)))
}

/// GET /v1/vin/{vin}/full
pub async fn lookup_by_vin(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(vin): Path<String>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Envelope<VinReport>>, ApiError> {
    let vin = parse_vin(&vin)?;

    debug!(vin = %vin, "VIN lookup with local data merge");

    let options = params.options()?;
    let result = state.resolver.lookup_by_vin(&vin, &options).await?;

    if result.report.is_none() {
        return Err(ApiError::no_local_data(format!(
            "VIN {} decoded successfully but no local data matches the decoded vehicle",
            vin
        )));
    }

    Ok(Json(Envelope::new(result, &meta)))
}
