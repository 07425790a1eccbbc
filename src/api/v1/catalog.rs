//! Make/model/trim enumeration handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Envelope, RequestMeta};
use crate::api::v1::params::parse_opt_i32;

#[derive(Debug, Deserialize, Default)]
pub struct CatalogParams {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

impl CatalogParams {
    fn year(&self) -> Result<Option<i32>, ApiError> {
        parse_opt_i32(self.year.as_deref(), "year")
    }

    fn make(&self) -> Option<&str> {
        self.make.as_deref().filter(|v| !v.trim().is_empty())
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// GET /v1/makes
pub async fn list_makes(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let makes = state.vehicles.list_makes(params.year()?).await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "makes": makes }),
        &meta,
    )))
}

/// GET /v1/models
pub async fn list_models(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let models = state
        .vehicles
        .list_models(params.make(), params.year()?)
        .await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "models": models }),
        &meta,
    )))
}

/// GET /v1/trims
pub async fn list_trims(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    let trims = state
        .vehicles
        .list_trims(params.make(), params.model(), params.year()?)
        .await?;

    Ok(Json(Envelope::new(
        serde_json::json!({ "trims": trims }),
        &meta,
    )))
}
