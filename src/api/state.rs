//! Application state for shared services

use std::sync::Arc;

use crate::domain::vehicle::VehicleRepository;
use crate::infrastructure::auth::AuthService;
use crate::infrastructure::rate_limit::RateLimitStore;
use crate::infrastructure::usage::UsageRecorder;
use crate::infrastructure::vehicle::LookupResolver;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub resolver: Arc<LookupResolver>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub recorder: UsageRecorder,
}
