//! Great-circle distance

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinate;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in kilometers on a sphere of radius 6371 km
pub fn haversine_km(p1: Coordinate, p2: Coordinate) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    // Rounding can push `a` just past 1 for near-antipodal points
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_distance() {
        let p = Coordinate::new(3.848, 11.502);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (Coordinate::new(3.85, 11.5), Coordinate::new(4.051, 9.768)),
            (Coordinate::new(-33.9, 151.2), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(89.9, 0.0), Coordinate::new(-89.9, 179.9)),
            (Coordinate::new(0.0, -179.9), Coordinate::new(0.0, 179.9)),
        ];
        for (a, b) in pairs {
            assert_abs_diff_eq!(haversine_km(a, b), haversine_km(b, a), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(41.7128, -74.0060);
        assert_abs_diff_eq!(haversine_km(a, b), 111.19, epsilon = 0.05);
    }

    #[test]
    fn test_yaounde_to_douala() {
        let yaounde = Coordinate::new(3.85, 11.5);
        let douala = Coordinate::new(4.051, 9.768);
        assert_abs_diff_eq!(haversine_km(yaounde, douala), 193.43, epsilon = 0.05);
    }

    #[test]
    fn test_antipodal_points_are_half_the_circumference() {
        let a = Coordinate::new(-44.9892, 0.0312);
        let b = Coordinate::new(44.9892, -179.9688);
        let d = haversine_km(a, b);

        assert!(d.is_finite());
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 0.5);
        assert_eq!(d, haversine_km(b, a));
    }

    #[test]
    fn test_antipodal_sweep_is_finite() {
        let mut lat = -89.5;
        while lat < 90.0 {
            let mut lng = -179.5;
            while lng < 0.0 {
                let p = Coordinate::new(lat, lng);
                let q = Coordinate::new(-lat, lng + 180.0);
                let d = haversine_km(p, q);
                assert!(d.is_finite(), "NaN for {} -> {}", p, q);
                assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM);
                lng += 0.731;
            }
            lat += 0.377;
        }
    }

    #[test]
    fn test_antimeridian() {
        let west = Coordinate::new(0.0, 179.9);
        let east = Coordinate::new(0.0, -179.9);
        assert!(haversine_km(west, east) < 23.0);
    }
}
