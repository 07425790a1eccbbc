//! Vehicle record family
//!
//! Specification, warranty, market value and maintenance rows share the
//! natural (year, make, model, trim) key. All monetary amounts are integer
//! cents; floating point never touches stored money.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Identifier of a specification row, used by the by-id routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(Uuid);

impl VehicleId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Technical specification of a vehicle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    pub id: VehicleId,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_style: Option<String>,
}

/// A single warranty coverage entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarrantyEntry {
    pub id: Uuid,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    /// Coverage category, e.g. "basic", "powertrain", "corrosion"
    pub coverage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fixed vehicle condition scale for market values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.to_ascii_lowercase().as_str() {
            "excellent" => Ok(Self::Excellent),
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            other => Err(DomainError::validation(format!(
                "Unknown condition '{}', expected one of excellent, good, fair, poor",
                other
            ))),
        }
    }
}

/// Market valuation for one condition of a vehicle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketValue {
    pub id: Uuid,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    pub condition: Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_in_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_party_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_retail_cents: Option<i64>,
}

/// One scheduled maintenance entry, keyed additionally by mileage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub id: Uuid,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    pub mileage: i32,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_months: Option<i32>,
}
