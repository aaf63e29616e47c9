pub const TRIPS_TABLE_NAME: &str = "Trips";
pub const TRIP_ID: &str = "trip_id";
pub const TIMESTAMP: &str = "timestamp";
pub const DISTANCE: &str = "distance";
pub const DURATION: &str = "duration";
pub const SAMPLES: &str = "samples";
