use geo::{Distance, Haversine, Point};

/// Great-circle distance in meters between two WGS84 coordinates.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    Haversine::distance(Point::new(lng1, lat1), Point::new(lng2, lat2))
}

/// Total length in meters of an ordered (lat, lng) polyline. Empty or
/// single-point input yields 0.
pub fn route_length_m(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance_m(w[0].0, w[0].1, w[1].0, w[1].1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_same_point_is_zero() {
        assert_eq!(haversine_distance_m(-34.6037, -58.3816, -34.6037, -58.3816), 0.0);
    }

    #[test]
    fn distance_one_degree_latitude() {
        // One degree of latitude is ~111.2km anywhere on the globe.
        let d = haversine_distance_m(-34.0, -58.0, -35.0, -58.0);
        assert!((d - 111_200.0).abs() < 1_000.0, "got {}", d);
    }

    #[test]
    fn route_length_sums_consecutive_legs() {
        let route = vec![(-34.0, -58.0), (-34.5, -58.0), (-35.0, -58.0)];
        let total = route_length_m(&route);
        let direct = haversine_distance_m(-34.0, -58.0, -35.0, -58.0);
        assert!((total - direct).abs() < 1.0);
        assert_eq!(route_length_m(&route[..1]), 0.0);
        assert_eq!(route_length_m(&[]), 0.0);
    }
}
