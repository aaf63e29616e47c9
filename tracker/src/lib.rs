pub mod location_source;
pub mod trip_session;
