use chrono::{DateTime, TimeDelta, Utc};
use geo_types::Point;

use crate::{geo_util::haversine_distance, location_sample::LocationSample, trip_record::TripRecord, TrackerError};

/// Fixes with an accuracy radius at or above this are discarded. Meters.
pub const MAX_HORIZONTAL_ACCURACY: f64 = 20.0;
/// Fixes captured this long before (or after) evaluation are discarded as cached. Seconds.
pub const MAX_SAMPLE_AGE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorConfig {
    pub max_horizontal_accuracy: f64,
    pub max_sample_age: TimeDelta,
}

impl AccumulatorConfig {
    /// Thresholds from user input. Both must be positive, otherwise every fix would be rejected.
    pub fn new(max_horizontal_accuracy: f64, max_sample_age: i64) -> Result<Self, TrackerError> {
        if !(max_horizontal_accuracy.is_finite() && max_horizontal_accuracy > 0.) {
            return Err(TrackerError::InvalidConfig("max horizontal accuracy must be a positive number of meters"));
        }
        if max_sample_age <= 0 {
            return Err(TrackerError::InvalidConfig("max sample age must be a positive number of seconds"));
        }
        let max_sample_age = TimeDelta::try_seconds(max_sample_age)
            .ok_or(TrackerError::InvalidConfig("max sample age is out of range"))?;

        Ok(Self {
            max_horizontal_accuracy,
            max_sample_age,
        })
    }
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            max_horizontal_accuracy: MAX_HORIZONTAL_ACCURACY,
            max_sample_age: TimeDelta::seconds(MAX_SAMPLE_AGE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LowAccuracy,
    Stale,
}

/// The line between the previous and the newly accepted fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSegment {
    pub from: Point,
    pub to: Point,
    pub length: f64, // meters
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    /// Holds the new segment, or None for the first fix of a trip.
    Accepted(Option<TrackSegment>),
    Rejected(RejectReason),
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted(_))
    }
}

/// Turns a noisy stream of fixes into an ordered trail and a running distance.
///
/// Idle until `reset` starts a trip, and idle again after `finish`.
/// `ingest` and `finish` on an idle accumulator return `TrackerError::NoActiveTrip`
/// without touching the state.
#[derive(Debug, Clone, Default)]
pub struct TripAccumulator {
    config: AccumulatorConfig,
    samples: Vec<LocationSample>,
    total_distance: f64,
    active: bool,
}

impl TripAccumulator {
    pub fn new(config: AccumulatorConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
            total_distance: 0.,
            active: false,
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.total_distance = 0.;
        self.active = true;
    }

    pub fn ingest(&mut self, sample: LocationSample, now: DateTime<Utc>) -> Result<IngestOutcome, TrackerError> {
        if !self.active {
            return Err(TrackerError::NoActiveTrip);
        }

        if let Some(reason) = self.check(&sample, now) {
            tracing::trace!("Rejected fix at {}: {:?}", sample.captured_at, reason);
            return Ok(IngestOutcome::Rejected(reason));
        }

        let segment = self.samples.last().map(|last| TrackSegment {
            from: last.position,
            to: sample.position,
            length: haversine_distance(last.position, sample.position),
        });

        if let Some(segment) = &segment {
            self.total_distance += segment.length;
        }
        self.samples.push(sample);

        tracing::debug!("Accepted fix #{}, total distance {:.1} m", self.samples.len(), self.total_distance);
        Ok(IngestOutcome::Accepted(segment))
    }

    /// Ends the trip. `duration` is the elapsed seconds counted by the caller's timer.
    pub fn finish(&mut self, duration: i64, finished_at: DateTime<Utc>) -> Result<TripRecord, TrackerError> {
        if !self.active {
            return Err(TrackerError::NoActiveTrip);
        }
        self.active = false;

        Ok(TripRecord::new(self.total_distance, duration, finished_at, self.samples.clone()))
    }

    fn check(&self, sample: &LocationSample, now: DateTime<Utc>) -> Option<RejectReason> {
        // Written as a negated "<" so NaN accuracy is rejected too
        if !(sample.horizontal_accuracy < self.config.max_horizontal_accuracy) {
            return Some(RejectReason::LowAccuracy);
        }

        let age = (now - sample.captured_at).num_milliseconds().abs();
        if age >= self.config.max_sample_age.num_milliseconds() {
            return Some(RejectReason::Stale);
        }

        None
    }

    pub fn samples(&self) -> &[LocationSample] {
        &self.samples
    }

    pub fn last_sample(&self) -> Option<&LocationSample> {
        self.samples.last()
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }
}
