use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "sqlx")]
use sqlx::{prelude::*, sqlite::SqliteRow};

use crate::location_sample::LocationSample;

/// A completed trip. Created once when the trip is finished and never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripRecord {
    pub distance: f64, // meters
    pub duration: i64, // seconds
    pub finished_at: DateTime<Utc>,
    pub samples: Vec<LocationSample>,
}

impl TripRecord {
    pub fn new(distance: f64, duration: i64, finished_at: DateTime<Utc>, samples: Vec<LocationSample>) -> Self {
        Self {
            distance,
            duration,
            finished_at,
            samples,
        }
    }

    /// Meters per second, or None for a trip without elapsed time.
    pub fn average_speed(&self) -> Option<f64> {
        if self.duration <= 0 {
            return None;
        }
        Some(self.distance / self.duration as f64)
    }

    pub fn last_sample(&self) -> Option<&LocationSample> {
        self.samples.last()
    }
}

/// A trip record together with the id the store assigned to it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoredTrip {
    pub trip_id: i64,
    pub record: TripRecord,
}

#[cfg(feature = "sqlx")]
impl FromRow<'_, SqliteRow> for StoredTrip {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let blob: Vec<u8> = row.try_get(4)?;
        let samples = crate::location_sample::decode_samples(&blob).map_err(|e| sqlx::Error::Decode(e))?;

        Ok(Self {
            trip_id: row.try_get(0)?,
            record: TripRecord {
                finished_at: row.try_get(1)?,
                distance: row.try_get(2)?,
                duration: row.try_get(3)?,
                samples,
            },
        })
    }
}
