//! In-memory vehicle repository
//!
//! Vec-backed so results come out in insertion order, which doubles as the
//! deterministic tie-break the trait requires.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::vehicle::query::{make_matches, model_matches, trim_matches};
use crate::domain::vehicle::{
    Condition, MaintenanceItem, MarketValue, SpecSearch, Specification, TrimFilter, VehicleId,
    VehicleQuery, VehicleRepository, WarrantyEntry,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    specifications: Vec<Specification>,
    warranty: Vec<WarrantyEntry>,
    market_values: Vec<MarketValue>,
    maintenance: Vec<MaintenanceItem>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryVehicleRepository {
    store: Arc<RwLock<Store>>,
    should_fail: Arc<RwLock<bool>>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_specification(&self, spec: Specification) {
        self.store.write().await.specifications.push(spec);
    }

    pub async fn insert_warranty(&self, entry: WarrantyEntry) {
        self.store.write().await.warranty.push(entry);
    }

    pub async fn insert_market_value(&self, value: MarketValue) {
        self.store.write().await.market_values.push(value);
    }

    pub async fn insert_maintenance(&self, item: MaintenanceItem) {
        self.store.write().await.maintenance.push(item);
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Simulated storage failure"));
        }

        Ok(())
    }

    fn row_matches(
        query: &VehicleQuery,
        trim: &TrimFilter,
        year: i32,
        make: &str,
        model: &str,
        row_trim: Option<&str>,
    ) -> bool {
        year == query.year
            && make_matches(make, &query.make)
            && model_matches(model, &query.model)
            && trim_matches(row_trim, trim)
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn find_specification(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Option<Specification>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store
            .specifications
            .iter()
            .find(|s| {
                Self::row_matches(query, trim, s.year, &s.make, &s.model, s.trim.as_deref())
            })
            .cloned())
    }

    async fn specification_by_id(
        &self,
        id: VehicleId,
    ) -> Result<Option<Specification>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store.specifications.iter().find(|s| s.id == id).cloned())
    }

    async fn search_specifications(
        &self,
        search: &SpecSearch,
        limit: usize,
    ) -> Result<Vec<Specification>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store
            .specifications
            .iter()
            .filter(|s| {
                search.year.is_none_or(|y| s.year == y)
                    && search
                        .make
                        .as_deref()
                        .is_none_or(|m| make_matches(&s.make, m))
                    && search
                        .model
                        .as_deref()
                        .is_none_or(|m| model_matches(&s.model, m))
                    && search.trim.as_deref().is_none_or(|t| {
                        trim_matches(s.trim.as_deref(), &TrimFilter::Prefix(t.to_string()))
                    })
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_warranty(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Vec<WarrantyEntry>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store
            .warranty
            .iter()
            .filter(|w| {
                Self::row_matches(query, trim, w.year, &w.make, &w.model, w.trim.as_deref())
            })
            .cloned()
            .collect())
    }

    async fn find_market_values(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        condition: Option<Condition>,
        limit: usize,
    ) -> Result<Vec<MarketValue>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        Ok(store
            .market_values
            .iter()
            .filter(|v| {
                Self::row_matches(query, trim, v.year, &v.make, &v.model, v.trim.as_deref())
                    && condition.is_none_or(|c| v.condition == c)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_maintenance(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        limit: usize,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        let mut items: Vec<MaintenanceItem> = store
            .maintenance
            .iter()
            .filter(|m| {
                Self::row_matches(query, trim, m.year, &m.make, &m.model, m.trim.as_deref())
            })
            .cloned()
            .collect();

        items.sort_by_key(|m| m.mileage);
        items.truncate(limit);

        Ok(items)
    }

    async fn list_makes(&self, year: Option<i32>) -> Result<Vec<String>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        let mut makes: Vec<String> = store
            .specifications
            .iter()
            .filter(|s| year.is_none_or(|y| s.year == y))
            .map(|s| s.make.clone())
            .collect();

        makes.sort();
        makes.dedup();

        Ok(makes)
    }

    async fn list_models(
        &self,
        make: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        let mut models: Vec<String> = store
            .specifications
            .iter()
            .filter(|s| {
                year.is_none_or(|y| s.year == y) && make.is_none_or(|m| make_matches(&s.make, m))
            })
            .map(|s| s.model.clone())
            .collect();

        models.sort();
        models.dedup();

        Ok(models)
    }

    async fn list_trims(
        &self,
        make: Option<&str>,
        model: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError> {
        self.check_should_fail().await?;

        let store = self.store.read().await;
        let mut trims: Vec<String> = store
            .specifications
            .iter()
            .filter(|s| {
                year.is_none_or(|y| s.year == y)
                    && make.is_none_or(|m| make_matches(&s.make, m))
                    && model.is_none_or(|m| model_matches(&s.model, m))
            })
            .filter_map(|s| s.trim.clone())
            .collect();

        trims.sort();
        trims.dedup();

        Ok(trims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn spec(year: i32, make: &str, model: &str, trim: Option<&str>) -> Specification {
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

    #[tokio::test]
    async fn test_find_specification_case_insensitive() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec(2024, "Toyota", "Camry", Some("XSE")))
            .await;

        let query = VehicleQuery::new(2024, "toyota", "CAMRY");
        let found = repo
            .find_specification(&query, &TrimFilter::Any)
            .await
            .unwrap();

        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_trim_filter_excludes_non_matching_rows() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec(2024, "Toyota", "Camry", Some("LE")))
            .await;

        let query = VehicleQuery::new(2024, "Toyota", "Camry");
        let filter = TrimFilter::Prefix("XSE".to_string());

        assert!(repo
            .find_specification(&query, &filter)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let repo = InMemoryVehicleRepository::new();
        for i in 0..10 {
            repo.insert_specification(spec(2024, "Toyota", &format!("Model{}", i), None))
                .await;
        }

        let search = SpecSearch {
            year: Some(2024),
            ..Default::default()
        };
        let results = repo.search_specifications(&search, 3).await.unwrap();

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_list_makes_dedupes_and_sorts() {
        let repo = InMemoryVehicleRepository::new();
        repo.insert_specification(spec(2024, "Toyota", "Camry", None)).await;
        repo.insert_specification(spec(2024, "Honda", "Civic", None)).await;
        repo.insert_specification(spec(2024, "Toyota", "Corolla", None)).await;

        let makes = repo.list_makes(None).await.unwrap();

        assert_eq!(makes, vec!["Honda".to_string(), "Toyota".to_string()]);
    }

    #[tokio::test]
    async fn test_should_fail_surfaces_storage_error() {
        let repo = InMemoryVehicleRepository::new();
        repo.set_should_fail(true).await;

        let query = VehicleQuery::new(2024, "Toyota", "Camry");
        let result = repo.find_specification(&query, &TrimFilter::Any).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_maintenance_sorted_by_mileage() {
        let repo = InMemoryVehicleRepository::new();
        for mileage in [30_000, 5_000, 15_000] {
            repo.insert_maintenance(MaintenanceItem {
                id: Uuid::new_v4(),
                year: 2020,
                make: "Ford".to_string(),
                model: "F-150".to_string(),
                trim: None,
                mileage,
                service: "service".to_string(),
                estimated_cost_cents: None,
                interval_months: None,
            })
            .await;
        }

        let query = VehicleQuery::new(2020, "Ford", "F-150");
        let items = repo
            .find_maintenance(&query, &TrimFilter::Any, 50)
            .await
            .unwrap();
        let mileages: Vec<i32> = items.iter().map(|m| m.mileage).collect();

        assert_eq!(mileages, vec![5_000, 15_000, 30_000]);
    }
}
