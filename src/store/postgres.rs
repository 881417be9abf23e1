//! PostgreSQL backend keeping each vehicle as a JSONB document.
//!
//! Schema lives in `sql/schema.sql`.

use super::{check_key, StoreError, VehicleStore};
use crate::{
    identity::User,
    vehicles::{record, Vehicle},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use tracing::{instrument, warn};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a small pool to `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_vehicle(plate: String, body: &Value) -> Result<Vehicle, StoreError> {
    match record::parse_body(body) {
        Ok(parsed) => Ok(Vehicle::from_body(plate, parsed)),
        Err(source) => Err(StoreError::InvalidRecord { plate, source }),
    }
}

#[async_trait]
impl VehicleStore for PostgresStore {
    #[instrument(skip_all, fields(user = owner.id()))]
    async fn list(&self, owner: &User) -> Result<Vec<Vehicle>, StoreError> {
        let rows = sqlx::query("SELECT plate, body FROM vehicles WHERE user_id = $1 ORDER BY plate")
            .bind(owner.id())
            .fetch_all(&self.pool)
            .await?;

        let mut vehicles = Vec::with_capacity(rows.len());
        for row in rows {
            let plate: String = row.try_get("plate")?;
            let body: Value = row.try_get("body")?;
            match to_vehicle(plate, &body) {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(e) => warn!("skipping vehicle record: {e}"),
            }
        }

        Ok(vehicles)
    }

    #[instrument(skip(self, owner), fields(user = owner.id()))]
    async fn get(&self, owner: &User, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        check_key(owner, plate)?;
        let row = sqlx::query("SELECT body FROM vehicles WHERE user_id = $1 AND plate = $2")
            .bind(owner.id())
            .bind(plate)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: Value = row.try_get("body")?;
        to_vehicle(plate.to_string(), &body).map(Some)
    }

    #[instrument(skip_all, fields(user = owner.id(), plate = %vehicle.plate))]
    async fn put(&self, owner: &User, vehicle: &Vehicle) -> Result<(), StoreError> {
        check_key(owner, &vehicle.plate)?;
        let body = sqlx::types::Json(vehicle.body());

        sqlx::query(
            r"
            INSERT INTO vehicles (user_id, plate, body, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, plate)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            ",
        )
        .bind(owner.id())
        .bind(&vehicle.plate)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_vehicle_keeps_row_plate() -> Result<(), StoreError> {
        let vehicle = to_vehicle(
            "ABC123".to_string(),
            &json!({ "currentMileage": "10000", "type": "car" }),
        )?;
        assert_eq!(vehicle.plate, "ABC123");
        assert_eq!(vehicle.kind, "car");
        Ok(())
    }

    #[test]
    fn to_vehicle_flags_bad_body() {
        assert!(matches!(
            to_vehicle("ABC123".to_string(), &json!(42)),
            Err(StoreError::InvalidRecord { .. })
        ));
    }

    #[tokio::test]
    async fn lazy_pool_reports_name() {
        let Ok(pool) = PgPoolOptions::new().connect_lazy("postgres://localhost/tyretrack") else {
            panic!("lazy pool should build without connecting");
        };
        assert_eq!(PostgresStore::from_pool(pool).name(), "postgres");
    }
}
