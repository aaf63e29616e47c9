//! Text formatting for the values shown while tracking and in trip details.

use chrono::{DateTime, Utc};

/// `850 m` below one kilometer, `1.23 km` above.
pub fn distance(meters: f64) -> String {
    if meters < 1000. {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.)
    }
}

/// Positional and zero padded, `0:00:05`
pub fn time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}:{:02}", seconds / 3600, seconds % 3600 / 60, seconds % 60)
}

pub fn date(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(timestamp) => timestamp.format("%b %-d, %Y").to_string(),
        None => String::new(),
    }
}

/// Minutes per kilometer, `5:30 /km`
pub fn pace(meters: f64, seconds: i64) -> String {
    if meters <= 0. || seconds <= 0 {
        return "-".to_string();
    }

    let seconds_per_km = (seconds as f64 / (meters / 1000.)).round() as i64;
    format!("{}:{:02} /km", seconds_per_km / 60, seconds_per_km % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn distance_units() {
        assert_eq!(distance(0.), "0 m");
        assert_eq!(distance(849.6), "850 m");
        assert_eq!(distance(1000.), "1.00 km");
        assert_eq!(distance(12_346.), "12.35 km");
    }

    #[test]
    fn time_is_padded() {
        assert_eq!(time(0), "0:00:00");
        assert_eq!(time(5), "0:00:05");
        assert_eq!(time(3723), "1:02:03");
        assert_eq!(time(36_000), "10:00:00");
    }

    #[test]
    fn missing_date_is_blank() {
        assert_eq!(date(None), "");
        let t = Utc.with_ymd_and_hms(2017, 12, 6, 10, 0, 0).unwrap();
        assert_eq!(date(Some(t)), "Dec 6, 2017");
    }

    #[test]
    fn pace_per_km() {
        assert_eq!(pace(1000., 330), "5:30 /km");
        assert_eq!(pace(5000., 1500), "5:00 /km");
        assert_eq!(pace(0., 100), "-");
        assert_eq!(pace(100., 0), "-");
    }
}
