use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use location_tracker_lib::{
    accumulator::{AccumulatorConfig, IngestOutcome, TrackSegment, TripAccumulator},
    display, share,
    trip_record::TripRecord,
    TrackerError,
};
use tokio::sync::mpsc;

use crate::location_source::{FixBatch, LocationSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveStats {
    pub distance: f64, // meters
    pub elapsed: i64,  // seconds
}

/// One trip in progress: the accumulator plus the seconds counted by the tick timer.
pub struct TripSession {
    accumulator: TripAccumulator,
    elapsed: i64,
}

impl TripSession {
    pub fn new(config: AccumulatorConfig) -> Self {
        Self {
            accumulator: TripAccumulator::new(config),
            elapsed: 0,
        }
    }

    pub fn start(&mut self) {
        self.accumulator.reset();
        self.elapsed = 0;
        tracing::info!("Trip started");
    }

    /// Counts one second of an active trip.
    pub fn tick(&mut self) -> LiveStats {
        if self.accumulator.is_active() {
            self.elapsed += 1;
        }
        self.stats()
    }

    pub fn stats(&self) -> LiveStats {
        LiveStats {
            distance: self.accumulator.total_distance(),
            elapsed: self.elapsed,
        }
    }

    /// Ingests the batch in order and returns the new overlay segments.
    pub fn ingest_batch(&mut self, batch: FixBatch, now: DateTime<Utc>) -> Result<Vec<TrackSegment>, TrackerError> {
        let mut segments = Vec::new();
        for sample in batch {
            if let IngestOutcome::Accepted(Some(segment)) = self.accumulator.ingest(sample, now)? {
                segments.push(segment);
            }
        }
        Ok(segments)
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>) -> Result<TripRecord, TrackerError> {
        let record = self.accumulator.finish(self.elapsed, finished_at)?;
        tracing::info!("Trip finished: {} in {}", display::distance(record.distance), display::time(record.duration));
        Ok(record)
    }

    pub fn location_message(&self) -> Option<String> {
        share::location_message(self.accumulator.samples())
    }

    pub fn accumulator(&self) -> &TripAccumulator {
        &self.accumulator
    }
}

/// Runs one trip until `stop` resolves or the source runs dry.
///
/// Ticks and fix batches are handled by this single loop, so the session is never
/// touched from two places at once.
pub async fn run_trip<S, F>(source: S, config: AccumulatorConfig, stop: F) -> Result<TripRecord, TrackerError>
where
    S: LocationSource,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::channel::<FixBatch>(64);
    let source_task = source.spawn(tx);

    let mut session = TripSession::new(config);
    session.start();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately
    ticker.tick().await;

    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stats = session.tick();
                tracing::info!("Distance: {}  Time: {}", display::distance(stats.distance), display::time(stats.elapsed));
            }
            batch = rx.recv() => {
                let Some(batch) = batch else {
                    tracing::info!("Location source closed");
                    break;
                };

                match session.ingest_batch(batch, Utc::now()) {
                    Ok(segments) => {
                        for segment in segments {
                            tracing::debug!("Segment {:?} -> {:?} ({:.1} m)", segment.from, segment.to, segment.length);
                        }
                    },
                    Err(err) => {
                        source_task.abort();
                        return Err(err);
                    }
                }
            }
            _ = &mut stop => {
                tracing::info!("Trip stopped");
                break;
            }
        }
    }

    source_task.abort();

    if let Some(message) = session.location_message() {
        tracing::debug!("Last location: {}", message);
    }

    session.finish(Utc::now())
}
