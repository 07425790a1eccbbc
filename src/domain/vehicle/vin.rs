//! VIN type and decoder seam

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// 17 characters, alphanumeric, excluding I, O and Q per the standard VIN
/// alphabet.
static VIN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-HJ-NPR-Za-hj-npr-z0-9]{17}$").unwrap());

/// A validated Vehicle Identification Number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    pub fn new(vin: impl Into<String>) -> Result<Self, DomainError> {
        let vin = vin.into();

        if !VIN_PATTERN.is_match(&vin) {
            return Err(DomainError::validation(
                "VIN must be exactly 17 alphanumeric characters excluding I, O and Q",
            ));
        }

        Ok(Self(vin.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Vin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl std::fmt::Display for Vin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attributes decoded from a VIN by the external registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedVin {
    pub vin: Vin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

impl DecodedVin {
    /// Whether the decode produced enough of a key to run a local lookup
    pub fn has_lookup_key(&self) -> bool {
        self.year.is_some() && self.make.is_some() && self.model.is_some()
    }

    /// Year/make/model query seeded from the decode, when complete
    pub fn lookup_query(&self) -> Option<crate::domain::vehicle::VehicleQuery> {
        match (self.year, self.make.as_deref(), self.model.as_deref()) {
            (Some(year), Some(make), Some(model)) => {
                Some(crate::domain::vehicle::VehicleQuery::new(year, make, model))
            }
            _ => None,
        }
    }
}

/// Seam for the external VIN decode registry
#[async_trait]
pub trait VinDecoder: Send + Sync + Debug {
    async fn decode(&self, vin: &Vin) -> Result<DecodedVin, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vin() {
        let vin = Vin::new("1HGCM82633A004352").unwrap();
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn test_lowercase_vin_uppercased() {
        let vin = Vin::new("1hgcm82633a004352").unwrap();
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(Vin::new("1HGCM82633A00435").is_err());
        assert!(Vin::new("1HGCM82633A0043522").is_err());
        assert!(Vin::new("").is_err());
    }

    #[test]
    fn test_excluded_letters_rejected() {
        assert!(Vin::new("IHGCM82633A004352").is_err());
        assert!(Vin::new("OHGCM82633A004352").is_err());
        assert!(Vin::new("QHGCM82633A004352").is_err());
    }

    #[test]
    fn test_non_alphanumeric_rejected() {
        assert!(Vin::new("1HGCM82633A00435!").is_err());
    }

    #[test]
    fn test_decoded_vin_lookup_key() {
        let vin = Vin::new("1HGCM82633A004352").unwrap();
        let decoded = DecodedVin {
            vin: vin.clone(),
            year: Some(2003),
            make: Some("Honda".to_string()),
            model: Some("Accord".to_string()),
            trim: None,
            body_class: None,
            engine: None,
        };
        assert!(decoded.has_lookup_key());

        let partial = DecodedVin {
            vin,
            year: None,
            make: Some("Honda".to_string()),
            model: None,
            trim: None,
            body_class: None,
            engine: None,
        };
        assert!(!partial.has_lookup_key());
    }
}
