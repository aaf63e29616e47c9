use std::{fs::File, io::{BufReader, BufWriter, Read, Write}, path::Path, str::FromStr};

use chrono::{DateTime, Utc};
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Metadata, Track, TrackSegment, Waypoint};
use location_tracker_lib::trip_record::TripRecord;
use time::OffsetDateTime;

use crate::DataManagerError;

/// A timed track point read from a GPX file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpxFix {
    pub position: Point,
    pub time: DateTime<Utc>,
}

/// Reads every timed point of every track, in file order. Points without a time are skipped.
pub fn read_gpx_fixes<R: Read>(reader: R) -> Result<Vec<GpxFix>, DataManagerError> {
    let gpx = gpx::read(reader).map_err(|e| DataManagerError::Gpx(format!("Failed to parse GPX: {e}")))?;

    let mut fixes = Vec::new();
    let mut untimed = 0;
    for track in gpx.tracks {
        for segment in track.segments {
            for point in segment.points {
                let Some(time) = point.time else {
                    untimed += 1;
                    continue;
                };
                let time = time.format().map_err(|e| DataManagerError::Gpx(format!("Invalid point time: {e}")))?;
                let time = DateTime::from_str(&time).map_err(|e| DataManagerError::Gpx(format!("Invalid point time {time}: {e}")))?;
                fixes.push(GpxFix {
                    position: point.point(),
                    time,
                });
            }
        }
    }

    if untimed > 0 {
        tracing::warn!("Skipped {} GPX points without time", untimed);
    }

    Ok(fixes)
}

pub fn read_gpx_fixes_file(path: &Path) -> Result<Vec<GpxFix>, DataManagerError> {
    let file = File::open(path).map_err(|e| DataManagerError::Io(format!("Failed to open {:?}: {e}", path)))?;
    read_gpx_fixes(BufReader::new(file))
}

/// Writes the trip as a GPX 1.1 document with a single track segment.
pub fn write_trip_gpx<W: Write>(record: &TripRecord, writer: W) -> Result<(), DataManagerError> {
    let mut segment = TrackSegment::new();
    for sample in &record.samples {
        let mut waypoint = Waypoint::new(sample.position);
        waypoint.time = Some(to_gpx_time(sample.captured_at)?);
        segment.points.push(waypoint);
    }

    let mut track = Track::new();
    track.name = Some(format!("Trip {}", record.finished_at.format("%Y-%m-%d %H:%M")));
    track.segments.push(segment);

    let metadata = Metadata {
        time: Some(to_gpx_time(record.finished_at)?),
        ..Default::default()
    };

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("location_tracker".to_string()),
        metadata: Some(metadata),
        tracks: vec![track],
        ..Default::default()
    };

    gpx::write(&gpx, writer).map_err(|e| DataManagerError::Gpx(format!("Failed to write GPX: {e}")))
}

pub fn write_trip_gpx_file(record: &TripRecord, path: &Path) -> Result<(), DataManagerError> {
    let file = File::create(path).map_err(|e| DataManagerError::Io(format!("Failed to create {:?}: {e}", path)))?;
    write_trip_gpx(record, BufWriter::new(file))
}

fn to_gpx_time(timestamp: DateTime<Utc>) -> Result<gpx::Time, DataManagerError> {
    let nanos = timestamp.timestamp_nanos_opt()
        .ok_or_else(|| DataManagerError::Gpx(format!("Timestamp out of range: {timestamp}")))?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .map(gpx::Time::from)
        .map_err(|e| DataManagerError::Gpx(format!("Timestamp out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use location_tracker_lib::location_sample::LocationSample;

    use super::*;

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning</name>
    <trkseg>
      <trkpt lat="55.6761" lon="12.5683"><time>2017-12-06T10:00:00Z</time></trkpt>
      <trkpt lat="55.6770" lon="12.5690"></trkpt>
      <trkpt lat="55.6780" lon="12.5700"><time>2017-12-06T10:00:05Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn reads_timed_points() {
        let fixes = read_gpx_fixes(TRACK.as_bytes()).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].position, Point::new(12.5683, 55.6761));
        assert_eq!(fixes[0].time, Utc.with_ymd_and_hms(2017, 12, 6, 10, 0, 0).unwrap());
        assert_eq!(fixes[1].time - fixes[0].time, TimeDelta::seconds(5));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(read_gpx_fixes("not gpx".as_bytes()), Err(DataManagerError::Gpx(_))));
    }

    #[test]
    fn exported_trip_reads_back() {
        let start = Utc.with_ymd_and_hms(2017, 12, 6, 10, 0, 0).unwrap();
        let samples: Vec<LocationSample> = (0..4)
            .map(|i| LocationSample::from_lat_lon(55.0 + i as f64 * 0.001, 12.0, 5., start + TimeDelta::seconds(i)))
            .collect();
        let record = TripRecord::new(333.6, 4, start + TimeDelta::seconds(4), samples.clone());

        let mut out = Vec::new();
        write_trip_gpx(&record, &mut out).unwrap();
        let fixes = read_gpx_fixes(out.as_slice()).unwrap();

        assert_eq!(fixes.len(), samples.len());
        for (fix, sample) in fixes.iter().zip(&samples) {
            assert_eq!(fix.time, sample.captured_at);
            assert!((fix.position.y() - sample.latitude()).abs() < 1e-9);
            assert!((fix.position.x() - sample.longitude()).abs() < 1e-9);
        }
    }
}
