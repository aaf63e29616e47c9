use serde::{Deserialize, Serialize};

use crate::trip_record::TripRecord;

/// Totals over a set of past trips.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TripSummary {
    pub trip_count: usize,
    pub total_distance: f64,   // meters
    pub total_duration: i64,   // seconds
    pub longest_distance: f64, // meters
}

impl TripSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TripRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            summary.trip_count += 1;
            summary.total_distance += record.distance;
            summary.total_duration += record.duration;
            summary.longest_distance = summary.longest_distance.max(record.distance);
            summary
        })
    }

    /// Meters per second over all trips
    pub fn average_speed(&self) -> Option<f64> {
        if self.total_duration <= 0 {
            return None;
        }
        Some(self.total_distance / self.total_duration as f64)
    }
}
