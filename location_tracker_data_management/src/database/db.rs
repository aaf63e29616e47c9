use std::{path::Path, str::FromStr};

use const_format::concatcp;
use location_tracker_lib::{location_sample::encode_samples, trip_record::{StoredTrip, TripRecord}};
use sqlx::{query, query_as, sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite, SqlitePool};

use crate::DataManagerError;

use super::constants::*;

const TRIP_COLUMNS: &str = concatcp!(TRIP_ID, ", ", TIMESTAMP, ", ", DISTANCE, ", ", DURATION, ", ", SAMPLES);

/// Append-only store of finished trips.
#[derive(Clone)]
pub struct TripDatabase {
    pool: Pool<Sqlite>,
}

impl TripDatabase {
    pub async fn connect(path: &Path) -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await
            .map_err(|e| DataManagerError::Database(format!("Failed to connect to database {:?}: {e}", path)))?;

        let db = Self {
            pool
        };

        db.init().await?;

        Ok(db)
    }

    /// A private database that lives as long as this handle. Used for tests and dry runs.
    pub async fn in_memory() -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DataManagerError::Database(format!("Invalid database options: {e}")))?;

        // Every connection would get its own memory database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options).await
            .map_err(|e| DataManagerError::Database(format!("Failed to open in-memory database: {e}")))?;

        let db = Self {
            pool
        };

        db.init().await?;

        Ok(db)
    }

    pub async fn init(&self) -> Result<(), DataManagerError> {
        query(concatcp!("
            CREATE TABLE IF NOT EXISTS ", TRIPS_TABLE_NAME, "(",
                TRIP_ID,   " INTEGER PRIMARY KEY AUTOINCREMENT,",
                TIMESTAMP, " TIMESTAMP NOT NULL,",
                DISTANCE,  " REAL NOT NULL,",
                DURATION,  " INTEGER NOT NULL,",
                SAMPLES,   " BLOB NOT NULL
            )"))
            .execute(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to create tables: {e}")))
            .map(|_| ())
    }

    pub async fn insert_trip(&self, record: &TripRecord) -> Result<i64, DataManagerError> {
        let samples = encode_samples(&record.samples)
            .map_err(|e| DataManagerError::Encoding(format!("Failed to encode samples: {e}")))?;

        query_as::<_, (i64,)>(concatcp!("
            INSERT INTO ", TRIPS_TABLE_NAME, "(",
            TIMESTAMP, ", ", DISTANCE, ", ", DURATION, ", ", SAMPLES, ")
            VALUES (?1, ?2, ?3, ?4) RETURNING ", TRIP_ID))
                .bind(record.finished_at)
                .bind(record.distance)
                .bind(record.duration)
                .bind(samples)
                .fetch_one(&self.pool).await
                .map_err(|e| DataManagerError::Database(format!("Failed to insert trip: {e}")))
                .map(|row| row.0)
    }

    pub async fn get_trip(&self, trip_id: i64) -> Result<StoredTrip, DataManagerError> {
        query_as::<_, StoredTrip>(concatcp!("SELECT ", TRIP_COLUMNS, " FROM ", TRIPS_TABLE_NAME, " WHERE ", TRIP_ID, " = ?1"))
            .bind(trip_id)
            .fetch_optional(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to get trip: {e}")))?
            .ok_or_else(|| DataManagerError::Database(format!("No trip with id {trip_id}")))
    }

    /// Newest first
    pub async fn get_trips(&self) -> Result<Vec<StoredTrip>, DataManagerError> {
        query_as::<_, StoredTrip>(concatcp!("SELECT ", TRIP_COLUMNS, " FROM ", TRIPS_TABLE_NAME, " ORDER BY ", TIMESTAMP, " DESC, ", TRIP_ID, " DESC"))
            .fetch_all(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to get trips: {e}")))
    }

    pub async fn get_latest_trip(&self) -> Result<Option<StoredTrip>, DataManagerError> {
        query_as::<_, StoredTrip>(concatcp!("SELECT ", TRIP_COLUMNS, " FROM ", TRIPS_TABLE_NAME, " ORDER BY ", TIMESTAMP, " DESC, ", TRIP_ID, " DESC LIMIT 1"))
            .fetch_optional(&self.pool).await
            .map_err(|e| DataManagerError::Database(format!("Failed to get latest trip: {e}")))
    }
}
