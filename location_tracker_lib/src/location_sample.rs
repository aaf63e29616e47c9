use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A single fix as reported by a location source.
/// The position is stored as x = longitude, y = latitude.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub position: Point,
    pub horizontal_accuracy: f64, // meters
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(position: Point, horizontal_accuracy: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            position,
            horizontal_accuracy,
            captured_at,
        }
    }

    pub fn from_lat_lon(latitude: f64, longitude: f64, horizontal_accuracy: f64, captured_at: DateTime<Utc>) -> Self {
        Self::new(Point::new(longitude, latitude), horizontal_accuracy, captured_at)
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

/// Decodes a samples blob as written by `encode_samples`.
pub fn decode_samples(bytes: &[u8]) -> Result<Vec<LocationSample>, bincode::Error> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    bincode::deserialize(bytes)
}

pub fn encode_samples(samples: &[LocationSample]) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(samples)
}
