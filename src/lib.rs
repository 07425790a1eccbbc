//! CarData Gateway
//!
//! A metered vehicle-data API gateway: API-key authentication, per-
//! organization rate limiting and monthly quotas, vehicle lookups with a
//! degrade-gracefully matching strategy, and best-effort usage accounting.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use api::state::AppState;
use config::{RateLimitBackend, StoreBackend, VinDecoderBackend};
use domain::credential::CredentialRepository;
use domain::usage::UsageRepository;
use domain::vehicle::{VehicleRepository, VinDecoder};
use infrastructure::auth::AuthService;
use infrastructure::credential::{InMemoryCredentialRepository, PostgresCredentialRepository};
use infrastructure::rate_limit::{LocalWindowStore, RateLimitStore, RedisWindowStore};
use infrastructure::usage::{InMemoryUsageRepository, PostgresUsageRepository, UsageRecorder};
use infrastructure::vehicle::{
    InMemoryVehicleRepository, LookupResolver, PostgresVehicleRepository,
};
use infrastructure::vin::{CachedVinDecoder, StaticVinDecoder, VpicClient};

/// Create application state from environment configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::load().unwrap_or_default();
    create_app_state_with_config(&config).await
}

/// Create application state with explicit configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let (credentials, vehicles, usage): (
        Arc<dyn CredentialRepository>,
        Arc<dyn VehicleRepository>,
        Arc<dyn UsageRepository>,
    ) = match config.database.backend {
        StoreBackend::Memory => (
            Arc::new(InMemoryCredentialRepository::new()),
            Arc::new(InMemoryVehicleRepository::new()),
            Arc::new(InMemoryUsageRepository::new()),
        ),
        StoreBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .context("database.url is required for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;

            (
                Arc::new(PostgresCredentialRepository::new(pool.clone())),
                Arc::new(PostgresVehicleRepository::new(pool.clone())),
                Arc::new(PostgresUsageRepository::new(pool)),
            )
        }
    };

    let rate_limiter: Arc<dyn RateLimitStore> = match config.rate_limit.backend {
        RateLimitBackend::Local => Arc::new(LocalWindowStore::new()),
        RateLimitBackend::Redis => {
            let url = config
                .rate_limit
                .redis_url
                .as_deref()
                .context("rate_limit.redis_url is required for the redis backend")?;

            Arc::new(
                RedisWindowStore::connect(url)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        }
    };

    let decoder: Arc<dyn VinDecoder> = match config.vin_decoder.backend {
        VinDecoderBackend::Vpic => {
            let client = VpicClient::new(
                &config.vin_decoder.base_url,
                Duration::from_secs(config.vin_decoder.timeout_secs),
            )?;

            Arc::new(CachedVinDecoder::new(
                client,
                Duration::from_secs(config.vin_decoder.cache_ttl_secs),
                config.vin_decoder.cache_capacity,
            ))
        }
        VinDecoderBackend::Static => Arc::new(StaticVinDecoder::empty()),
    };

    let auth = AuthService::new(credentials, usage.clone());
    let resolver = Arc::new(LookupResolver::new(vehicles.clone(), decoder));
    let recorder = UsageRecorder::new(usage);

    Ok(AppState {
        auth,
        rate_limiter,
        resolver,
        vehicles,
        recorder,
    })
}
