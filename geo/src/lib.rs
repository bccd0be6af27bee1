//! Great-circle math over WGS84 coordinates.
//!
//! This is the single distance implementation in the workspace. Both the
//! duplicate gate (submission time) and the evidence radius check
//! (resolution time) call [`distance_meters`], so the two paths can never
//! drift numerically.

use civica_types::Coordinate;

/// WGS84 mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Pure and total: coordinates are validated at construction, and the
/// intermediate term is clamped into `[0, 1]` so `asin` never sees a value
/// pushed out of domain by rounding.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    EARTH_RADIUS_METERS * 2.0 * h.sqrt().asin()
}

/// Initial bearing from `a` to `b` in degrees, normalized to `[0, 360)`.
/// North is 0, east is 90.
pub fn initial_bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    /// Relative tolerance for comparisons against reference values.
    const REL_TOL: f64 = 1e-4;

    fn assert_close(actual: f64, expected: f64) {
        let tol = expected.abs().max(1.0) * REL_TOL;
        assert!(
            (actual - expected).abs() <= tol,
            "expected ~{expected}, got {actual}"
        );
    }

    #[test]
    fn reference_fixture_indore() {
        let d = distance_meters(coord(22.7512, 75.8754), coord(22.7520, 75.8760));
        assert_close(d, 108.1599457);
    }

    #[test]
    fn short_east_west_hop() {
        let d = distance_meters(coord(40.7128, -74.0060), coord(40.7128, -74.0057));
        assert_close(d, 25.2853473);
    }

    #[test]
    fn one_degree_along_equator() {
        let d = distance_meters(coord(0.0, 0.0), coord(0.0, 1.0));
        assert_close(d, 111_194.9266);
    }

    #[test]
    fn antipodal_points_half_circumference() {
        let d = distance_meters(coord(0.0, 0.0), coord(0.0, 180.0));
        assert_close(d, 20_015_086.796);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert_close(initial_bearing_degrees(coord(0.0, 0.0), coord(1.0, 0.0)), 0.0);
        assert_close(
            initial_bearing_degrees(coord(0.0, 0.0), coord(0.0, 1.0)),
            90.0,
        );
    }

    #[test]
    fn bearing_fixture_northeast() {
        let b = initial_bearing_degrees(coord(22.7512, 75.8754), coord(22.7520, 75.8760));
        assert_close(b, 34.6692703);
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = coord(lat, lon);
            prop_assert_eq!(distance_meters(c, c), 0.0);
        }

        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let a = coord(lat1, lon1);
            let b = coord(lat2, lon2);
            let ab = distance_meters(a, b);
            let ba = distance_meters(b, a);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
        }

        #[test]
        fn distance_is_nonnegative_and_bounded(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let d = distance_meters(coord(lat1, lon1), coord(lat2, lon2));
            prop_assert!(d >= 0.0);
            // Nothing on a sphere is farther than half the circumference.
            prop_assert!(d <= EARTH_RADIUS_METERS * std::f64::consts::PI + 1.0);
        }

        #[test]
        fn bearing_in_range(
            lat1 in -89.0f64..=89.0, lon1 in -180.0f64..=180.0,
            lat2 in -89.0f64..=89.0, lon2 in -180.0f64..=180.0,
        ) {
            let b = initial_bearing_degrees(coord(lat1, lon1), coord(lat2, lon2));
            prop_assert!((0.0..360.0).contains(&b));
        }
    }
}
