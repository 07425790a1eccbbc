//! Vehicle lookup resolver
//!
//! Composes the repository queries behind the public lookup routes. Trim
//! fallback is an ordered strategy list: with a trim supplied, first the
//! prefix-constrained pass, then the unconstrained pass, stopping at the
//! first non-empty result per record family. A trim that matches nothing is
//! never an error as long as the year/make/model has data.

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::domain::vehicle::{
    Condition, DecodedVin, MaintenanceItem, MarketValue, Specification, TrimFilter, VehicleQuery,
    VehicleRepository, Vin, VinDecoder, WarrantyEntry, MAINTENANCE_CAP, MARKET_VALUE_CAP,
};
use crate::domain::DomainError;

/// Miles per year an average vehicle is assumed to accumulate
const EXPECTED_MILES_PER_YEAR: i64 = 12_000;

/// Optional refinements to a year/make/model lookup
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    pub trim: Option<String>,
    pub condition: Option<Condition>,
    pub mileage: Option<i32>,
    pub current_mileage: Option<i32>,
}

/// Everything known about one vehicle configuration
#[derive(Debug, Clone, Serialize)]
pub struct VehicleReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<Specification>,
    pub warranty: Vec<WarrantyEntry>,
    pub market_values: Vec<MarketValue>,
    pub maintenance: Vec<MaintenanceItem>,
}

impl VehicleReport {
    pub fn is_empty(&self) -> bool {
        self.specs.is_none()
            && self.warranty.is_empty()
            && self.market_values.is_empty()
            && self.maintenance.is_empty()
    }
}

/// Outcome of a VIN lookup that merges local data: the decode always
/// succeeds by the time this exists, but the local store may know nothing
/// about the decoded configuration.
#[derive(Debug, Clone, Serialize)]
pub struct VinReport {
    pub decoded: DecodedVin,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub report: Option<VehicleReport>,
}

/// Per-configuration depreciation adjustment in cents: ten cents per mile
/// away from the expected-mileage baseline, negative above it.
pub fn mileage_adjustment_cents(model_year: i32, actual_miles: i32, current_year: i32) -> i64 {
    let age_years = i64::from(current_year - model_year).max(0);
    let expected_miles = age_years * EXPECTED_MILES_PER_YEAR;

    (i64::from(actual_miles) - expected_miles) * -10
}

fn apply_adjustment(values: &mut [MarketValue], adjustment_cents: i64) {
    for value in values {
        for figure in [
            &mut value.trade_in_cents,
            &mut value.private_party_cents,
            &mut value.dealer_retail_cents,
        ] {
            if let Some(cents) = figure {
                *cents += adjustment_cents;
            }
        }
    }
}

/// Ordered trim strategies for one lookup
fn trim_strategies(trim: Option<&str>) -> Vec<TrimFilter> {
    match trim {
        Some(trim) => vec![TrimFilter::Prefix(trim.to_string()), TrimFilter::Any],
        None => vec![TrimFilter::Any],
    }
}

#[derive(Debug, Clone)]
pub struct LookupResolver {
    vehicles: Arc<dyn VehicleRepository>,
    decoder: Arc<dyn VinDecoder>,
}

impl LookupResolver {
    pub fn new(vehicles: Arc<dyn VehicleRepository>, decoder: Arc<dyn VinDecoder>) -> Self {
        Self { vehicles, decoder }
    }

    /// Full report for a year/make/model, with graceful trim fallback.
    ///
    /// Returns `NotFound` only when every record family is empty; partial
    /// data is a success with empty collections for the missing families.
    pub async fn lookup(
        &self,
        query: &VehicleQuery,
        options: &LookupOptions,
    ) -> Result<VehicleReport, DomainError> {
        let strategies = trim_strategies(options.trim.as_deref());

        let specs = self.resolve_specification(query, &strategies).await?;
        let warranty = self.resolve_warranty(query, &strategies).await?;
        let market_values = self.resolve_market_values(query, &strategies, options).await?;
        let maintenance = self.resolve_maintenance(query, &strategies, options).await?;

        let report = VehicleReport {
            specs,
            warranty,
            market_values,
            maintenance,
        };

        if report.is_empty() {
            return Err(DomainError::not_found(format!(
                "No data for {} {} {}",
                query.year, query.make, query.model
            )));
        }

        Ok(report)
    }

    /// Decode a VIN without touching the local store.
    pub async fn decode_vin(&self, vin: &Vin) -> Result<DecodedVin, DomainError> {
        self.decoder.decode(vin).await
    }

    /// Decode a VIN, then merge whatever the local store knows about the
    /// decoded configuration. A successful decode with zero local rows is a
    /// distinct outcome (`report: None`), not a VIN error.
    pub async fn lookup_by_vin(
        &self,
        vin: &Vin,
        options: &LookupOptions,
    ) -> Result<VinReport, DomainError> {
        let decoded = self.decoder.decode(vin).await?;

        let Some(query) = decoded.lookup_query() else {
            debug!(vin = %vin, "decode returned no year/make/model, skipping local lookup");
            return Ok(VinReport {
                decoded,
                report: None,
            });
        };

        let merged = LookupOptions {
            trim: options.trim.clone().or_else(|| decoded.trim.clone()),
            condition: options.condition,
            mileage: options.mileage,
            current_mileage: options.current_mileage,
        };

        match self.lookup(&query, &merged).await {
            Ok(report) => Ok(VinReport {
                decoded,
                report: Some(report),
            }),
            Err(DomainError::NotFound { .. }) => Ok(VinReport {
                decoded,
                report: None,
            }),
            Err(err) => Err(err),
        }
    }

    pub async fn market_values(
        &self,
        query: &VehicleQuery,
        options: &LookupOptions,
    ) -> Result<Vec<MarketValue>, DomainError> {
        let strategies = trim_strategies(options.trim.as_deref());

        self.resolve_market_values(query, &strategies, options).await
    }

    pub async fn maintenance(
        &self,
        query: &VehicleQuery,
        options: &LookupOptions,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        let strategies = trim_strategies(options.trim.as_deref());

        self.resolve_maintenance(query, &strategies, options).await
    }

    pub async fn warranty(
        &self,
        query: &VehicleQuery,
        options: &LookupOptions,
    ) -> Result<Vec<WarrantyEntry>, DomainError> {
        let strategies = trim_strategies(options.trim.as_deref());

        self.resolve_warranty(query, &strategies).await
    }

    async fn resolve_specification(
        &self,
        query: &VehicleQuery,
        strategies: &[TrimFilter],
    ) -> Result<Option<Specification>, DomainError> {
        for strategy in strategies {
            if let Some(spec) = self.vehicles.find_specification(query, strategy).await? {
                return Ok(Some(spec));
            }
        }

        Ok(None)
    }

    async fn resolve_warranty(
        &self,
        query: &VehicleQuery,
        strategies: &[TrimFilter],
    ) -> Result<Vec<WarrantyEntry>, DomainError> {
        for strategy in strategies {
            let entries = self.vehicles.find_warranty(query, strategy).await?;

            if !entries.is_empty() {
                return Ok(entries);
            }
        }

        Ok(Vec::new())
    }

    async fn resolve_market_values(
        &self,
        query: &VehicleQuery,
        strategies: &[TrimFilter],
        options: &LookupOptions,
    ) -> Result<Vec<MarketValue>, DomainError> {
        let mut values = Vec::new();

        for strategy in strategies {
            values = self
                .vehicles
                .find_market_values(query, strategy, options.condition, MARKET_VALUE_CAP)
                .await?;

            if !values.is_empty() {
                break;
            }
        }

        if let Some(mileage) = options.mileage {
            let adjustment =
                mileage_adjustment_cents(query.year, mileage, Utc::now().year());
            apply_adjustment(&mut values, adjustment);
        }

        Ok(values)
    }

    async fn resolve_maintenance(
        &self,
        query: &VehicleQuery,
        strategies: &[TrimFilter],
        options: &LookupOptions,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        let mut items = Vec::new();

        for strategy in strategies {
            items = self
                .vehicles
                .find_maintenance(query, strategy, MAINTENANCE_CAP)
                .await?;

            if !items.is_empty() {
                break;
            }
        }

        // "Upcoming service" semantics: only entries at or past the
        // caller's odometer reading.
        if let Some(current) = options.current_mileage {
            items.retain(|item| item.mileage >= current);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::VehicleId;
    use crate::infrastructure::vehicle::InMemoryVehicleRepository;
    use crate::infrastructure::vin::StaticVinDecoder;
    use uuid::Uuid;

    fn spec_row(year: i32, make: &str, model: &str, trim: Option<&str>) -> Specification {
        Specification {
            id: VehicleId::generate(),
            year,
            make: make.to_string(),
            model: model.to_string(),
            trim: trim.map(str::to_string),
            engine: None,
            transmission: None,
            drivetrain: None,
            fuel_type: None,
            doors: None,
            body_style: None,
        }
    }

    fn value_row(
        year: i32,
        make: &str,
        model: &str,
        trim: Option<&str>,
        condition: Condition,
        trade_in_cents: i64,
    ) -> MarketValue {
        MarketValue {
            id: Uuid::new_v4(),
            year,
            make: make.to_string(),
            model: model.to_string(),
            trim: trim.map(str::to_string),
            condition,
            trade_in_cents: Some(trade_in_cents),
            private_party_cents: Some(trade_in_cents + 50_000),
            dealer_retail_cents: None,
        }
    }

    fn maintenance_row(
        year: i32,
        make: &str,
        model: &str,
        mileage: i32,
        service: &str,
    ) -> MaintenanceItem {
        MaintenanceItem {
            id: Uuid::new_v4(),
            year,
            make: make.to_string(),
            model: model.to_string(),
            trim: None,
            mileage,
            service: service.to_string(),
            estimated_cost_cents: None,
            interval_months: None,
        }
    }

    async fn resolver_with(repo: InMemoryVehicleRepository) -> LookupResolver {
        LookupResolver::new(Arc::new(repo), Arc::new(StaticVinDecoder::empty()))
    }

    #[tokio::test]
    async fn test_lookup_not_found_when_all_families_empty() {
        let resolver = resolver_with(InMemoryVehicleRepository::new()).await;
        let query = VehicleQuery::new(2024, "Toyota", "Camry");

        let result = resolver.lookup(&query, &LookupOptions::default()).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_lookup_partial_data_succeeds() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec_row(2024, "Toyota", "Camry", Some("XSE")))
            .await;
        let resolver = resolver_with(repo).await;

        let query = VehicleQuery::new(2024, "Toyota", "Camry");
        let report = resolver
            .lookup(&query, &LookupOptions::default())
            .await
            .unwrap();

        assert!(report.specs.is_some());
        assert!(report.warranty.is_empty());
        assert!(report.market_values.is_empty());
        assert!(report.maintenance.is_empty());
    }

    #[tokio::test]
    async fn test_trim_fallback_matches_trimless_lookup() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec_row(2024, "Toyota", "Camry", Some("LE")))
            .await;
        let resolver = resolver_with(repo).await;

        let query = VehicleQuery::new(2024, "Toyota", "Camry");
        let with_bogus_trim = LookupOptions {
            trim: Some("Platinum Ultra".to_string()),
            ..Default::default()
        };

        let fallback = resolver.lookup(&query, &with_bogus_trim).await.unwrap();
        let trimless = resolver
            .lookup(&query, &LookupOptions::default())
            .await
            .unwrap();

        assert_eq!(
            fallback.specs.as_ref().map(|s| s.id),
            trimless.specs.as_ref().map(|s| s.id)
        );
    }

    #[tokio::test]
    async fn test_trim_prefix_preferred_over_fallback() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec_row(2024, "Toyota", "Camry", Some("LE")))
            .await;
        repo.insert_specification(spec_row(2024, "Toyota", "Camry", Some("XSE/XSE V6")))
            .await;
        let resolver = resolver_with(repo).await;

        let query = VehicleQuery::new(2024, "Toyota", "Camry");
        let options = LookupOptions {
            trim: Some("XSE".to_string()),
            ..Default::default()
        };

        let report = resolver.lookup(&query, &options).await.unwrap();

        assert_eq!(
            report.specs.unwrap().trim.as_deref(),
            Some("XSE/XSE V6")
        );
    }

    #[tokio::test]
    async fn test_hyphen_space_model_variants_match() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec_row(2023, "Honda", "CR V", None)).await;
        let resolver = resolver_with(repo).await;

        let hyphenated = VehicleQuery::new(2023, "Honda", "CR-V");
        let report = resolver
            .lookup(&hyphenated, &LookupOptions::default())
            .await
            .unwrap();

        assert_eq!(report.specs.unwrap().model, "CR V");
    }

    #[tokio::test]
    async fn test_mileage_adjustment_formula() {
        // 3-year-old vehicle expected at 36,000 miles; 30,000 actual is
        // 6,000 under, worth +$600.00.
        assert_eq!(mileage_adjustment_cents(2021, 30_000, 2024), 60_000);
        // 10,000 over baseline costs $1,000.00.
        assert_eq!(mileage_adjustment_cents(2021, 46_000, 2024), -100_000);
        // Exactly on baseline.
        assert_eq!(mileage_adjustment_cents(2021, 36_000, 2024), 0);
    }

    #[tokio::test]
    async fn test_adjustment_applied_to_every_present_figure() {
        let mut values = vec![
            value_row(2021, "Toyota", "Camry", None, Condition::Good, 1_500_000),
            value_row(2021, "Toyota", "Camry", None, Condition::Fair, 1_200_000),
        ];

        apply_adjustment(&mut values, -100_000);

        assert_eq!(values[0].trade_in_cents, Some(1_400_000));
        assert_eq!(values[0].private_party_cents, Some(1_450_000));
        assert_eq!(values[0].dealer_retail_cents, None);
        assert_eq!(values[1].trade_in_cents, Some(1_100_000));
    }

    #[tokio::test]
    async fn test_maintenance_upcoming_filter_and_order() {
        let repo = InMemoryVehicleRepository::new();
        for mileage in [5_000, 30_000, 15_000, 60_000] {
            repo.insert_maintenance(maintenance_row(
                2020,
                "Ford",
                "F-150",
                mileage,
                "service",
            ))
            .await;
        }
        let resolver = resolver_with(repo).await;

        let query = VehicleQuery::new(2020, "Ford", "F-150");
        let options = LookupOptions {
            current_mileage: Some(15_000),
            ..Default::default()
        };

        let items = resolver.maintenance(&query, &options).await.unwrap();
        let mileages: Vec<i32> = items.iter().map(|i| i.mileage).collect();

        assert_eq!(mileages, vec![15_000, 30_000, 60_000]);
    }

    #[tokio::test]
    async fn test_vin_lookup_without_trim_skips_trim_pass() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec_row(2003, "Honda", "Accord", Some("EX")))
            .await;
        let decoder = StaticVinDecoder::decoding_to(2003, "Honda", "Accord", None);
        let resolver = LookupResolver::new(Arc::new(repo), Arc::new(decoder));

        let vin = Vin::new("1HGCM82633A004352").unwrap();
        let result = resolver
            .lookup_by_vin(&vin, &LookupOptions::default())
            .await
            .unwrap();

        let report = result.report.expect("local data should merge");
        assert_eq!(report.specs.unwrap().make, "Honda");
    }

    #[tokio::test]
    async fn test_vin_decode_ok_but_no_local_rows() {
        let decoder = StaticVinDecoder::decoding_to(1999, "Saab", "9-5", None);
        let resolver = LookupResolver::new(
            Arc::new(InMemoryVehicleRepository::new()),
            Arc::new(decoder),
        );

        let vin = Vin::new("1HGCM82633A004352").unwrap();
        let result = resolver
            .lookup_by_vin(&vin, &LookupOptions::default())
            .await
            .unwrap();

        assert_eq!(result.decoded.make.as_deref(), Some("Saab"));
        assert!(result.report.is_none());
    }
}
