//! PostgreSQL vehicle repository implementation
//!
//! Matching rules are pushed into SQL: model names compare after lowering
//! and folding hyphens to spaces, makes compare lowered, trim filters are
//! ILIKE prefix matches. Optional filters bind as nullable parameters so
//! every method keeps a single static statement.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::vehicle::{
    Condition, MaintenanceItem, MarketValue, SpecSearch, Specification, TrimFilter, VehicleId,
    VehicleQuery, VehicleRepository, WarrantyEntry,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of VehicleRepository
#[derive(Debug, Clone)]
pub struct PostgresVehicleRepository {
    pool: PgPool,
}

impl PostgresVehicleRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn trim_prefix(trim: &TrimFilter) -> Option<&str> {
    match trim {
        TrimFilter::Prefix(prefix) => Some(prefix.as_str()),
        TrimFilter::Any => None,
    }
}

const YMM_WHERE: &str = r#"
    year = $1
    AND lower(make) = lower($2)
    AND lower(replace(model, '-', ' ')) = lower(replace($3, '-', ' '))
    AND ($4::text IS NULL OR trim ILIKE $4 || '%')
"#;

#[async_trait]
impl VehicleRepository for PostgresVehicleRepository {
    async fn find_specification(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Option<Specification>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT id, year, make, model, trim, engine, transmission, drivetrain,
                   fuel_type, doors, body_style
            FROM vehicle_specifications
            WHERE {}
            ORDER BY id
            LIMIT 1
            "#,
            YMM_WHERE
        ))
        .bind(query.year)
        .bind(&query.make)
        .bind(&query.model)
        .bind(trim_prefix(trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find specification: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_specification(&row))),
            None => Ok(None),
        }
    }

    async fn specification_by_id(
        &self,
        id: VehicleId,
    ) -> Result<Option<Specification>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, year, make, model, trim, engine, transmission, drivetrain,
                   fuel_type, doors, body_style
            FROM vehicle_specifications
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get specification: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_specification(&row))),
            None => Ok(None),
        }
    }

    async fn search_specifications(
        &self,
        search: &SpecSearch,
        limit: usize,
    ) -> Result<Vec<Specification>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, year, make, model, trim, engine, transmission, drivetrain,
                   fuel_type, doors, body_style
            FROM vehicle_specifications
            WHERE ($1::int IS NULL OR year = $1)
              AND ($2::text IS NULL OR lower(make) = lower($2))
              AND ($3::text IS NULL
                   OR lower(replace(model, '-', ' ')) = lower(replace($3, '-', ' ')))
              AND ($4::text IS NULL OR trim ILIKE $4 || '%')
            ORDER BY year, make, model, trim NULLS FIRST
            LIMIT $5
            "#,
        )
        .bind(search.year)
        .bind(search.make.as_deref())
        .bind(search.model.as_deref())
        .bind(search.trim.as_deref())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to search specifications: {}", e)))?;

        Ok(rows.iter().map(row_to_specification).collect())
    }

    async fn find_warranty(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
    ) -> Result<Vec<WarrantyEntry>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT id, year, make, model, trim, coverage, months, miles, notes
            FROM vehicle_warranties
            WHERE {}
            ORDER BY id
            "#,
            YMM_WHERE
        ))
        .bind(query.year)
        .bind(&query.make)
        .bind(&query.model)
        .bind(trim_prefix(trim))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find warranty entries: {}", e)))?;

        Ok(rows.iter().map(row_to_warranty).collect())
    }

    async fn find_market_values(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        condition: Option<Condition>,
        limit: usize,
    ) -> Result<Vec<MarketValue>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT id, year, make, model, trim, condition, trade_in_cents,
                   private_party_cents, dealer_retail_cents
            FROM vehicle_market_values
            WHERE {}
              AND ($5::text IS NULL OR condition = $5)
            ORDER BY id
            LIMIT $6
            "#,
            YMM_WHERE
        ))
        .bind(query.year)
        .bind(&query.make)
        .bind(&query.model)
        .bind(trim_prefix(trim))
        .bind(condition.map(|c| c.as_str()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find market values: {}", e)))?;

        rows.iter().map(row_to_market_value).collect()
    }

    async fn find_maintenance(
        &self,
        query: &VehicleQuery,
        trim: &TrimFilter,
        limit: usize,
    ) -> Result<Vec<MaintenanceItem>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT id, year, make, model, trim, mileage, service,
                   estimated_cost_cents, interval_months
            FROM vehicle_maintenance_schedules
            WHERE {}
            ORDER BY mileage, id
            LIMIT $5
            "#,
            YMM_WHERE
        ))
        .bind(query.year)
        .bind(&query.make)
        .bind(&query.model)
        .bind(trim_prefix(trim))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find maintenance entries: {}", e)))?;

        Ok(rows.iter().map(row_to_maintenance).collect())
    }

    async fn list_makes(&self, year: Option<i32>) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT make
            FROM vehicle_specifications
            WHERE ($1::int IS NULL OR year = $1)
            ORDER BY make
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list makes: {}", e)))
    }

    async fn list_models(
        &self,
        make: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT model
            FROM vehicle_specifications
            WHERE ($1::text IS NULL OR lower(make) = lower($1))
              AND ($2::int IS NULL OR year = $2)
            ORDER BY model
            "#,
        )
        .bind(make)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list models: {}", e)))
    }

    async fn list_trims(
        &self,
        make: Option<&str>,
        model: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT trim
            FROM vehicle_specifications
            WHERE trim IS NOT NULL
              AND ($1::text IS NULL OR lower(make) = lower($1))
              AND ($2::text IS NULL
                   OR lower(replace(model, '-', ' ')) = lower(replace($2, '-', ' ')))
              AND ($3::int IS NULL OR year = $3)
            ORDER BY trim
            "#,
        )
        .bind(make)
        .bind(model)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list trims: {}", e)))
    }
}

fn row_to_specification(row: &sqlx::postgres::PgRow) -> Specification {
    Specification {
        id: VehicleId::new(row.get::<Uuid, _>("id")),
        year: row.get("year"),
        make: row.get("make"),
        model: row.get("model"),
        trim: row.get("trim"),
        engine: row.get("engine"),
        transmission: row.get("transmission"),
        drivetrain: row.get("drivetrain"),
        fuel_type: row.get("fuel_type"),
        doors: row.get("doors"),
        body_style: row.get("body_style"),
    }
}

fn row_to_warranty(row: &sqlx::postgres::PgRow) -> WarrantyEntry {
    WarrantyEntry {
        id: row.get("id"),
        year: row.get("year"),
        make: row.get("make"),
        model: row.get("model"),
        trim: row.get("trim"),
        coverage: row.get("coverage"),
        months: row.get("months"),
        miles: row.get("miles"),
        notes: row.get("notes"),
    }
}

fn row_to_market_value(row: &sqlx::postgres::PgRow) -> Result<MarketValue, DomainError> {
    let condition: String = row.get("condition");

    Ok(MarketValue {
        id: row.get("id"),
        year: row.get("year"),
        make: row.get("make"),
        model: row.get("model"),
        trim: row.get("trim"),
        condition: Condition::parse(&condition)
            .map_err(|e| DomainError::storage(format!("Invalid condition in database: {}", e)))?,
        trade_in_cents: row.get("trade_in_cents"),
        private_party_cents: row.get("private_party_cents"),
        dealer_retail_cents: row.get("dealer_retail_cents"),
    })
}

fn row_to_maintenance(row: &sqlx::postgres::PgRow) -> MaintenanceItem {
    MaintenanceItem {
        id: row.get("id"),
        year: row.get("year"),
        make: row.get("make"),
        model: row.get("model"),
        trim: row.get("trim"),
        mileage: row.get("mileage"),
        service: row.get("service"),
        estimated_cost_cents: row.get("estimated_cost_cents"),
        interval_months: row.get("interval_months"),
    }
}
