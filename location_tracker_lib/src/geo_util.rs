use geo_types::Point;

/// Mean earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Great-circle distance in meters between two points given as (x = longitude, y = latitude).
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    let d_lat = (p2.y() - p1.y()).to_radians();
    let d_lon = (p2.x() - p1.x()).to_radians();
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();

    let a = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
    let c = 2. * f64::asin(f64::sqrt(a).min(1.));

    EARTH_RADIUS * c
}

/// Total length of a polyline in meters
pub fn path_length(points: impl IntoIterator<Item = Point>) -> f64 {
    let mut points = points.into_iter();
    let Some(mut prev) = points.next() else {
        return 0.;
    };

    let mut total = 0.;
    for point in points {
        total += haversine_distance(prev, point);
        prev = point;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(Point::new(0., 0.), Point::new(0., 1.));
        assert!((d - 111_195.08).abs() < 1.0, "{d}");
    }

    #[test]
    fn same_point_is_zero() {
        let p = Point::new(12.56, 55.67);
        assert_eq!(haversine_distance(p, p), 0.);
    }

    #[test]
    fn symmetric() {
        let a = Point::new(12.56, 55.67);
        let b = Point::new(10.20, 56.15);
        assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-6);
    }

    #[test]
    fn path_length_sums_legs() {
        let a = Point::new(0., 0.);
        let b = Point::new(0., 1.);
        let c = Point::new(1., 1.);
        let expected = haversine_distance(a, b) + haversine_distance(b, c);
        assert!((path_length([a, b, c]) - expected).abs() < 1e-6);
        assert_eq!(path_length([a]), 0.);
        assert_eq!(path_length(Vec::<Point>::new()), 0.);
    }
}
