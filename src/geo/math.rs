use std::f64::consts::PI;

use super::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Geofence ring vertices, closing point excluded.
pub const DEFAULT_RING_POINTS: usize = 64;

pub const MIN_RADIUS_M: u32 = 100;
pub const MAX_RADIUS_M: u32 = 5000;
pub const RADIUS_STEP_M: u32 = 100;

/// Great-circle distance in kilometers (haversine, spherical Earth).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat_rad().cos() * b.lat_rad().cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Camera zoom for the given station-to-satellite distance, within [5, 13].
pub fn zoom_for_distance(distance_km: f64) -> f64 {
    (13.0 - distance_km / 10.0).max(5.0)
}

/// Clamps a requested fence radius into range and snaps it to the step.
pub fn clamp_radius(requested_m: i64) -> u32 {
    let clamped = requested_m.clamp(i64::from(MIN_RADIUS_M), i64::from(MAX_RADIUS_M)) as u32;
    let snapped = (clamped + RADIUS_STEP_M / 2) / RADIUS_STEP_M * RADIUS_STEP_M;
    snapped.clamp(MIN_RADIUS_M, MAX_RADIUS_M)
}

/// Closed ring approximating a circle of `radius_m` around `center`; the
/// first vertex repeats as the last, giving `points + 1` entries.
pub fn circle_polygon(center: Coordinate, radius_m: u32, points: usize) -> Vec<Coordinate> {
    let points = points.max(3);
    let angular = (f64::from(radius_m) / 1000.0) / EARTH_RADIUS_KM;
    let lat1 = center.lat_rad();
    let lon1 = center.lon_rad();

    let mut ring = Vec::with_capacity(points + 1);
    for i in 0..points {
        let bearing = 2.0 * PI * i as f64 / points as f64;
        let lat2 =
            (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());
        ring.push(Coordinate {
            latitude: lat2.to_degrees(),
            longitude: normalize_lon(lon2.to_degrees()),
        });
    }
    let first = ring[0];
    ring.push(first);
    ring
}

fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_is_zero_for_identical_points() {
        let a = coord(12.5, -45.25);
        assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = coord(10.0, 10.0);
        let b = coord(-33.9, 151.2);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_longitude_at_equator_is_about_111_km() {
        let d = distance_km(coord(0.0, 10.0), coord(0.0, 11.0));
        assert!((d - 111.19).abs() < 1.0, "got {d}");
    }

    #[test]
    fn zoom_is_monotonically_non_increasing_and_bounded() {
        let mut last = f64::INFINITY;
        for d in [0.0, 1.0, 10.0, 50.0, 80.0, 200.0, 10_000.0] {
            let zoom = zoom_for_distance(d);
            assert!(zoom <= last);
            assert!((5.0..=13.0).contains(&zoom));
            last = zoom;
        }
    }

    #[test]
    fn zoom_caps_at_13_and_floors_at_5() {
        assert_eq!(zoom_for_distance(0.0), 13.0);
        assert_eq!(zoom_for_distance(50.0), 8.0);
        assert_eq!(zoom_for_distance(500.0), 5.0);
    }

    #[test]
    fn clamp_radius_enforces_domain_and_step() {
        assert_eq!(clamp_radius(50), 100);
        assert_eq!(clamp_radius(7000), 5000);
        assert_eq!(clamp_radius(1000), 1000);
        assert_eq!(clamp_radius(1234), 1200);
        assert_eq!(clamp_radius(-300), 100);
    }

    #[test]
    fn ring_is_closed_with_expected_vertex_count() {
        let center = coord(48.85, 2.35);
        for radius_m in [100, 1000, 5000] {
            let ring = circle_polygon(center, radius_m, DEFAULT_RING_POINTS);
            assert_eq!(ring.len(), DEFAULT_RING_POINTS + 1);
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn ring_vertices_are_valid_and_at_the_requested_radius() {
        let center = coord(-45.0, 170.0);
        let radius_m = 5000;
        for vertex in circle_polygon(center, radius_m, 32) {
            assert!(Coordinate::new(vertex.latitude, vertex.longitude).is_ok());
            let d_m = distance_km(center, vertex) * 1000.0;
            assert!((d_m - f64::from(radius_m)).abs() < 5.0, "vertex at {d_m} m");
        }
    }

    #[test]
    fn ring_longitudes_wrap_across_the_antimeridian() {
        let ring = circle_polygon(coord(0.0, 179.99), 5000, 32);
        for vertex in ring {
            assert!((-180.0..=180.0).contains(&vertex.longitude));
        }
    }
}
