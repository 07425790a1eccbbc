//! VIN decode backends
//!
//! [`VpicClient`] talks to the NHTSA vPIC registry over plain HTTP.
//! [`CachedVinDecoder`] wraps any decoder with a TTL cache; decoded VINs
//! never change, so the TTL exists only to bound memory. [`StaticVinDecoder`]
//! is a fixture-backed decoder for tests and offline development.

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::vehicle::{DecodedVin, Vin, VinDecoder};
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the NHTSA vPIC VIN decode registry
#[derive(Debug, Clone)]
pub struct VpicClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct VpicResponse {
    #[serde(rename = "Results")]
    results: Vec<VpicResult>,
}

#[derive(Debug, Deserialize)]
struct VpicResult {
    #[serde(rename = "ModelYear", default)]
    model_year: Option<String>,
    #[serde(rename = "Make", default)]
    make: Option<String>,
    #[serde(rename = "Model", default)]
    model: Option<String>,
    #[serde(rename = "Trim", default)]
    trim: Option<String>,
    #[serde(rename = "BodyClass", default)]
    body_class: Option<String>,
    #[serde(rename = "EngineModel", default)]
    engine_model: Option<String>,
}

/// vPIC returns "" rather than null for unknown attributes
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl VpicClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn with_defaults() -> Result<Self, DomainError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl VinDecoder for VpicClient {
    async fn decode(&self, vin: &Vin) -> Result<DecodedVin, DomainError> {
        let url = format!(
            "{}/vehicles/DecodeVinValues/{}?format=json",
            self.base_url, vin
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::registry(format!("VIN decode request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::registry(format!(
                "VIN decode registry returned status {}",
                response.status()
            )));
        }

        let body: VpicResponse = response
            .json()
            .await
            .map_err(|e| DomainError::registry(format!("Invalid VIN decode response: {}", e)))?;

        let result = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::registry("VIN decode response contained no results"))?;

        let year = non_empty(result.model_year)
            .map(|y| {
                y.parse::<i32>().map_err(|_| {
                    DomainError::registry(format!("Non-numeric model year '{}' in decode", y))
                })
            })
            .transpose()?;

        Ok(DecodedVin {
            vin: vin.clone(),
            year,
            make: non_empty(result.make),
            model: non_empty(result.model),
            trim: non_empty(result.trim),
            body_class: non_empty(result.body_class),
            engine: non_empty(result.engine_model),
        })
    }
}

/// TTL-cached wrapper around any decoder
#[derive(Debug)]
pub struct CachedVinDecoder<D: VinDecoder> {
    inner: D,
    cache: Cache<Vin, Arc<DecodedVin>>,
}

impl<D: VinDecoder> CachedVinDecoder<D> {
    pub fn new(inner: D, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl<D: VinDecoder> VinDecoder for CachedVinDecoder<D> {
    async fn decode(&self, vin: &Vin) -> Result<DecodedVin, DomainError> {
        if let Some(cached) = self.cache.get(vin).await {
            debug!(vin = %vin, "VIN decode cache hit");
            return Ok((*cached).clone());
        }

        let decoded = self.inner.decode(vin).await?;
        self.cache.insert(vin.clone(), Arc::new(decoded.clone())).await;

        Ok(decoded)
    }
}

/// Fixture-backed decoder: explicit per-VIN mappings, with an optional
/// fallback answer applied to any VIN not in the map.
#[derive(Debug, Default)]
pub struct StaticVinDecoder {
    mappings: RwLock<HashMap<Vin, DecodedVin>>,
    fallback: Option<FallbackDecode>,
}

#[derive(Debug, Clone)]
struct FallbackDecode {
    year: i32,
    make: String,
    model: String,
    trim: Option<String>,
}

impl StaticVinDecoder {
    /// Decoder that answers every VIN with empty attributes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decoder that answers every VIN with the given year/make/model
    pub fn decoding_to(year: i32, make: &str, model: &str, trim: Option<&str>) -> Self {
        Self {
            mappings: RwLock::new(HashMap::new()),
            fallback: Some(FallbackDecode {
                year,
                make: make.to_string(),
                model: model.to_string(),
                trim: trim.map(str::to_string),
            }),
        }
    }

    pub async fn insert(&self, decoded: DecodedVin) {
        self.mappings.write().await.insert(decoded.vin.clone(), decoded);
    }
}

#[async_trait]
impl VinDecoder for StaticVinDecoder {
    async fn decode(&self, vin: &Vin) -> Result<DecodedVin, DomainError> {
        if let Some(decoded) = self.mappings.read().await.get(vin) {
            return Ok(decoded.clone());
        }

        match &self.fallback {
            Some(fallback) => Ok(DecodedVin {
                vin: vin.clone(),
                year: Some(fallback.year),
                make: Some(fallback.make.clone()),
                model: Some(fallback.model.clone()),
                trim: fallback.trim.clone(),
                body_class: None,
                engine: None,
            }),
            None => Ok(DecodedVin {
                vin: vin.clone(),
                year: None,
                make: None,
                model: None,
                trim: None,
                body_class: None,
                engine: None,
            }),
        }
    }
}
