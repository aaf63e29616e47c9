use std::{fmt, path::PathBuf};

use const_format::concatcp;

pub mod database;
pub mod gpx_util;
mod data_manager;

pub use data_manager::*;

pub const DATA_DIR: &str = "data/";
pub const DATABASE_PATH: &str = concatcp!(DATA_DIR, "database.db");
pub const LOG_DIR: &str = concatcp!(DATA_DIR, "log");

/// Resolves a path like `DATA_DIR` or `LOG_DIR` against the project root, so every
/// binary uses the same data directory regardless of where it was started from.
pub fn project_path(relative: &str) -> Result<PathBuf, DataManagerError> {
    project_root::get_project_root()
        .map(|root| root.join(relative))
        .map_err(|e| DataManagerError::Io(format!("Failed to find project root: {e}")))
}

#[derive(Debug)]
pub enum DataManagerError {
    Database(String),
    Encoding(String),
    Gpx(String),
    Io(String),
}

impl fmt::Display for DataManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataManagerError::Database(msg) => write!(f, "Database error: {msg}"),
            DataManagerError::Encoding(msg) => write!(f, "Encoding error: {msg}"),
            DataManagerError::Gpx(msg) => write!(f, "GPX error: {msg}"),
            DataManagerError::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for DataManagerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_and_database_share_the_data_dir() {
        let data_dir = project_path(DATA_DIR).unwrap();
        let log_dir = project_path(LOG_DIR).unwrap();
        let database = project_path(DATABASE_PATH).unwrap();

        assert!(data_dir.is_absolute());
        assert!(log_dir.starts_with(&data_dir));
        assert!(database.starts_with(&data_dir));
    }
}
