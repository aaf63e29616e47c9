use std::time::Duration;

use chrono::Utc;
use location_tracker_data_management::gpx_util::GpxFix;
use location_tracker_lib::location_sample::LocationSample;
use tokio::{sync::mpsc, task::JoinHandle};

/// Fixes delivered together, in capture order.
pub type FixBatch = Vec<LocationSample>;

/// Produces fixes at its own pace. Dropping the sender ends the trip.
pub trait LocationSource: Send + 'static {
    fn spawn(self, tx: mpsc::Sender<FixBatch>) -> JoinHandle<()>;
}

/// Slowest replay allowed, a thousandth of real time.
pub const MIN_SPEEDUP: f64 = 0.001;

/// Plays back a recorded GPX track as if it was happening now.
///
/// Every point is stamped with the current time when it is sent, and the
/// gaps between points follow the recording divided by `speedup`.
pub struct GpxReplaySource {
    fixes: Vec<GpxFix>,
    accuracy: f64,
    speedup: f64,
}

impl GpxReplaySource {
    pub fn new(fixes: Vec<GpxFix>, accuracy: f64, speedup: f64) -> Self {
        let speedup = if !(speedup.is_finite() && speedup > 0.) {
            tracing::warn!("Invalid replay speedup {}, using 1", speedup);
            1.
        } else if speedup < MIN_SPEEDUP {
            tracing::warn!("Replay speedup {} is too slow, using {}", speedup, MIN_SPEEDUP);
            MIN_SPEEDUP
        } else {
            speedup
        };

        Self {
            fixes,
            accuracy,
            speedup,
        }
    }
}

impl LocationSource for GpxReplaySource {
    fn spawn(self, tx: mpsc::Sender<FixBatch>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut previous: Option<chrono::DateTime<Utc>> = None;
            for fix in self.fixes {
                if let Some(previous) = previous {
                    let recorded = (fix.time - previous).to_std().unwrap_or_default();
                    tokio::time::sleep(replay_gap(recorded, self.speedup)).await;
                }
                previous = Some(fix.time);

                let sample = LocationSample::new(fix.position, self.accuracy, Utc::now());
                if tx.send(vec![sample]).await.is_err() {
                    tracing::debug!("Trip ended, stopping replay");
                    return;
                }
            }
            tracing::info!("Replay finished");
        })
    }
}

/// The wait between two replayed fixes. Saturates instead of overflowing.
fn replay_gap(recorded: Duration, speedup: f64) -> Duration {
    Duration::try_from_secs_f64(recorded.as_secs_f64() / speedup).unwrap_or_else(|_| {
        tracing::warn!("Replay gap {:?} at speedup {} is out of range", recorded, speedup);
        Duration::MAX
    })
}

/// Sends prepared batches as they are, `interval` apart.
pub struct SampleBatchSource {
    batches: Vec<FixBatch>,
    interval: Duration,
}

impl SampleBatchSource {
    pub fn new(batches: Vec<FixBatch>, interval: Duration) -> Self {
        Self {
            batches,
            interval,
        }
    }
}

impl LocationSource for SampleBatchSource {
    fn spawn(self, tx: mpsc::Sender<FixBatch>) -> JoinHandle<()> {
        tokio::spawn(async move {
            for (i, batch) in self.batches.into_iter().enumerate() {
                if i > 0 && !self.interval.is_zero() {
                    tokio::time::sleep(self.interval).await;
                }
                if tx.send(batch).await.is_err() {
                    return;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use location_tracker_lib::geo_util::haversine_distance;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn replay_restamps_fixes() {
        let recorded = Utc.with_ymd_and_hms(2017, 12, 6, 10, 0, 0).unwrap();
        let fixes = (0..3)
            .map(|i| GpxFix {
                position: geo_types::Point::new(12.0, 55.0 + i as f64 * 0.001),
                time: recorded + TimeDelta::seconds(i * 4),
            })
            .collect();

        let (tx, mut rx) = mpsc::channel(8);
        let start = tokio::time::Instant::now();
        GpxReplaySource::new(fixes, 4., 2.).spawn(tx);

        let mut received = Vec::new();
        while let Some(batch) = rx.recv().await {
            received.extend(batch);
        }

        assert_eq!(received.len(), 3);
        // 8 recorded seconds at double speed
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5), "{elapsed:?}");
        for sample in &received {
            assert_eq!(sample.horizontal_accuracy, 4.);
            assert!((Utc::now() - sample.captured_at).num_seconds().abs() < 5);
        }
        assert!(haversine_distance(received[0].position, received[2].position) > 200.);
    }

    #[test]
    fn invalid_speedup_falls_back_to_real_time() {
        assert_eq!(GpxReplaySource::new(Vec::new(), 5., 0.).speedup, 1.);
        assert_eq!(GpxReplaySource::new(Vec::new(), 5., f64::NAN).speedup, 1.);
        assert_eq!(GpxReplaySource::new(Vec::new(), 5., 10.).speedup, 10.);
    }

    #[test]
    fn tiny_speedup_is_clamped() {
        assert_eq!(GpxReplaySource::new(Vec::new(), 5., 1e-300).speedup, MIN_SPEEDUP);
        assert_eq!(GpxReplaySource::new(Vec::new(), 5., MIN_SPEEDUP).speedup, MIN_SPEEDUP);
    }

    #[test]
    fn replay_gap_scales_and_saturates() {
        assert_eq!(replay_gap(Duration::from_secs(8), 2.), Duration::from_secs(4));
        assert_eq!(replay_gap(Duration::from_secs(1), MIN_SPEEDUP), Duration::from_secs(1000));
        assert_eq!(replay_gap(Duration::from_secs(3600), 1e-300), Duration::MAX);
        assert_eq!(replay_gap(Duration::ZERO, 1e-300), Duration::ZERO);
    }
}
