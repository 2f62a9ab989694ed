//! `SQLite` implementation of [`RouteStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use courier_app::ports::RouteStore;
use courier_domain::error::CourierError;
use courier_domain::id::StopId;
use courier_domain::stop::{Coordinates, Priority, Stop, StopStatus, TimeWindow};
use courier_domain::vehicle::Vehicle;

use crate::error::StorageError;

struct Wrapper(Stop);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let address: String = row.try_get("address")?;
        let lat: Option<f64> = row.try_get("lat")?;
        let lon: Option<f64> = row.try_get("lon")?;
        let load: f64 = row.try_get("load")?;
        let priority: String = row.try_get("priority")?;
        let window_start: Option<String> = row.try_get("window_start")?;
        let window_end: Option<String> = row.try_get("window_end")?;
        let status: String = row.try_get("status")?;
        let position: i64 = row.try_get("position")?;
        let created_at: String = row.try_get("created_at")?;
        let completed_at: Option<String> = row.try_get("completed_at")?;

        let id = StopId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let priority = Priority::from_str(&priority).map_err(decode_str)?;
        let status = StopStatus::from_str(&status).map_err(decode_str)?;
        let coordinates = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        };
        let window = TimeWindow {
            start: window_start.as_deref().map(parse_ts).transpose()?,
            end: window_end.as_deref().map(parse_ts).transpose()?,
        };
        let created_at = parse_ts(&created_at)?;
        let completed_at = completed_at.as_deref().map(parse_ts).transpose()?;

        Ok(Self(Stop {
            id,
            address,
            coordinates,
            load,
            priority,
            window,
            status,
            position: u32::try_from(position.max(0)).unwrap_or(u32::MAX),
            created_at,
            completed_at,
        }))
    }
}

fn parse_ts(value: &str) -> Result<courier_domain::time::Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

fn decode_str(err: String) -> sqlx::Error {
    sqlx::Error::Decode(err.into())
}

/// `SQLite`-backed route store.
pub struct SqliteRouteStore {
    pool: SqlitePool,
}

impl SqliteRouteStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RouteStore for SqliteRouteStore {
    async fn save_stop(&self, stop: &Stop) -> Result<(), CourierError> {
        sqlx::query(
                "INSERT INTO stops (id, address, lat, lon, load, priority, window_start, window_end, status, position, created_at, completed_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(stop.id.to_string())
            .bind(&stop.address)
            .bind(stop.coordinates.map(|c| c.lat))
            .bind(stop.coordinates.map(|c| c.lon))
            .bind(stop.load)
            .bind(stop.priority.to_string())
            .bind(stop.window.start.map(|ts| ts.to_rfc3339()))
            .bind(stop.window.end.map(|ts| ts.to_rfc3339()))
            .bind(stop.status.to_string())
            .bind(i64::from(stop.position))
            .bind(stop.created_at.to_rfc3339())
            .bind(stop.completed_at.map(|ts| ts.to_rfc3339()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn update_stop(&self, stop: &Stop) -> Result<(), CourierError> {
        sqlx::query(
                "UPDATE stops SET address = ?, lat = ?, lon = ?, load = ?, priority = ?, window_start = ?, window_end = ?, status = ?, position = ?, completed_at = ? WHERE id = ?",
            )
            .bind(&stop.address)
            .bind(stop.coordinates.map(|c| c.lat))
            .bind(stop.coordinates.map(|c| c.lon))
            .bind(stop.load)
            .bind(stop.priority.to_string())
            .bind(stop.window.start.map(|ts| ts.to_rfc3339()))
            .bind(stop.window.end.map(|ts| ts.to_rfc3339()))
            .bind(stop.status.to_string())
            .bind(i64::from(stop.position))
            .bind(stop.completed_at.map(|ts| ts.to_rfc3339()))
            .bind(stop.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete_stop(&self, id: StopId) -> Result<(), CourierError> {
        sqlx::query("DELETE FROM stops WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn save_ordering(&self, stops: &[Stop]) -> Result<(), CourierError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for stop in stops {
            sqlx::query("UPDATE stops SET position = ? WHERE id = ?")
                .bind(i64::from(stop.position))
                .bind(stop.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }
        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn load_stops(&self) -> Result<Vec<Stop>, CourierError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM stops ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), CourierError> {
        sqlx::query(
                "INSERT INTO vehicle (id, make, model, capacity, current_load, fuel_efficiency) VALUES (1, ?, ?, ?, ?, ?) ON CONFLICT(id) DO UPDATE SET make = excluded.make, model = excluded.model, capacity = excluded.capacity, current_load = excluded.current_load, fuel_efficiency = excluded.fuel_efficiency",
            )
            .bind(&vehicle.make)
            .bind(&vehicle.model)
            .bind(vehicle.capacity)
            .bind(vehicle.current_load)
            .bind(vehicle.fuel_efficiency)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn load_vehicle(&self) -> Result<Option<Vehicle>, CourierError> {
        let row = sqlx::query("SELECT make, model, capacity, current_load, fuel_efficiency FROM vehicle WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let vehicle = Vehicle {
            make: row.try_get("make").map_err(StorageError::from)?,
            model: row.try_get("model").map_err(StorageError::from)?,
            capacity: row.try_get("capacity").map_err(StorageError::from)?,
            current_load: row.try_get("current_load").map_err(StorageError::from)?,
            fuel_efficiency: row.try_get("fuel_efficiency").map_err(StorageError::from)?,
        };
        Ok(Some(vehicle))
    }
}
