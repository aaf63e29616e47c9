use std::fmt;

pub mod accumulator;
pub mod display;
pub mod geo_util;
pub mod location_sample;
pub mod share;
pub mod summary;
pub mod trip_record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    /// `ingest` or `finish` was called without a trip started by `reset`
    NoActiveTrip,
    InvalidConfig(&'static str),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::NoActiveTrip => write!(f, "No active trip"),
            TrackerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for TrackerError {}
