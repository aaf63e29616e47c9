use std::path::Path;

use location_tracker_lib::{summary::TripSummary, trip_record::{StoredTrip, TripRecord}};

use crate::{database::db::TripDatabase, gpx_util::{self, GpxFix}, project_path, DataManagerError, DATABASE_PATH, DATA_DIR};

#[derive(Clone)]
pub struct DataManager {
    pub(crate) database: TripDatabase,
}

/// The public interface for all location tracker data management.
impl DataManager {
    /// Opens the database in the data directory of the project, creating both if needed.
    pub async fn start() -> Result<Self, DataManagerError> {
        let data_dir = project_path(DATA_DIR)?;
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .map_err(|_| DataManagerError::Io(format!("Failed to create data directory: {:?}", data_dir)))?;
        }

        Self::open(&project_path(DATABASE_PATH)?).await
    }

    pub async fn open(path: &Path) -> Result<Self, DataManagerError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|_| DataManagerError::Io(format!("Failed to create directory: {:?}", parent)))?;
        }

        let database = TripDatabase::connect(path).await?;
        tracing::debug!("Opened trip database at {:?}", path);

        Ok(DataManager {
            database,
        })
    }

    pub async fn in_memory() -> Result<Self, DataManagerError> {
        Ok(DataManager {
            database: TripDatabase::in_memory().await?,
        })
    }

    pub async fn save_trip(&self, record: &TripRecord) -> Result<i64, DataManagerError> {
        let trip_id = self.database.insert_trip(record).await?;
        tracing::info!("Saved trip {} ({:.1} m, {} s, {} samples)", trip_id, record.distance, record.duration, record.samples.len());
        Ok(trip_id)
    }

    pub async fn get_trip(&self, trip_id: i64) -> Result<StoredTrip, DataManagerError> {
        self.database.get_trip(trip_id).await
    }

    pub async fn get_trips(&self) -> Result<Vec<StoredTrip>, DataManagerError> {
        self.database.get_trips().await
    }

    pub async fn latest_trip(&self) -> Result<Option<StoredTrip>, DataManagerError> {
        self.database.get_latest_trip().await
    }

    pub async fn trip_summary(&self) -> Result<TripSummary, DataManagerError> {
        let trips = self.database.get_trips().await?;
        Ok(TripSummary::from_records(trips.iter().map(|trip| &trip.record)))
    }

    pub fn import_gpx_fixes(&self, path: &Path) -> Result<Vec<GpxFix>, DataManagerError> {
        gpx_util::read_gpx_fixes_file(path)
    }

    pub async fn export_trip_gpx(&self, trip_id: i64, path: &Path) -> Result<(), DataManagerError> {
        let trip = self.database.get_trip(trip_id).await?;
        gpx_util::write_trip_gpx_file(&trip.record, path)?;
        tracing::info!("Exported trip {} to {:?}", trip_id, path);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use location_tracker_lib::location_sample::LocationSample;

    use super::*;

    fn record(distance: f64, duration: i64) -> TripRecord {
        let t = Utc.with_ymd_and_hms(2017, 12, 6, 10, 0, 0).unwrap();
        let samples = vec![
            LocationSample::from_lat_lon(55.0, 12.0, 5., t),
            LocationSample::from_lat_lon(55.01, 12.0, 5., t + TimeDelta::seconds(duration)),
        ];
        TripRecord::new(distance, duration, t + TimeDelta::seconds(duration), samples)
    }

    #[tokio::test]
    async fn summary_over_saved_trips() {
        let data_manager = DataManager::in_memory().await.unwrap();
        data_manager.save_trip(&record(1000., 400)).await.unwrap();
        data_manager.save_trip(&record(3000., 600)).await.unwrap();

        let summary = data_manager.trip_summary().await.unwrap();
        assert_eq!(summary.trip_count, 2);
        assert_eq!(summary.total_distance, 4000.);
        assert_eq!(summary.total_duration, 1000);
        assert_eq!(summary.longest_distance, 3000.);
    }

    #[tokio::test]
    async fn latest_trip_is_most_recently_finished() {
        let data_manager = DataManager::in_memory().await.unwrap();
        assert!(data_manager.latest_trip().await.unwrap().is_none());

        data_manager.save_trip(&record(1000., 400)).await.unwrap();
        let id = data_manager.save_trip(&record(2000., 900)).await.unwrap();
        assert_eq!(data_manager.latest_trip().await.unwrap().unwrap().trip_id, id);
    }

    #[tokio::test]
    async fn file_database_persists_between_opens() {
        let path = std::env::temp_dir().join(format!("location_tracker_test_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let id = {
            let data_manager = DataManager::open(&path).await.unwrap();
            data_manager.save_trip(&record(1234., 56)).await.unwrap()
        };

        let data_manager = DataManager::open(&path).await.unwrap();
        assert_eq!(data_manager.get_trip(id).await.unwrap().record, record(1234., 56));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn exports_stored_trip() {
        let data_manager = DataManager::in_memory().await.unwrap();
        let id = data_manager.save_trip(&record(1000., 400)).await.unwrap();

        let path = std::env::temp_dir().join(format!("location_tracker_export_{}.gpx", std::process::id()));
        data_manager.export_trip_gpx(id, &path).await.unwrap();

        let fixes = data_manager.import_gpx_fixes(&path).unwrap();
        assert_eq!(fixes.len(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
