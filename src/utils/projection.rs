//! World Mercator (EPSG:3395) on the WGS84 ellipsoid.
//!
//! The centroid of a geographic AOI is taken in a metric projection and
//! converted back, so planar coordinates only ever live inside this module.

const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Mercator is singular at the poles; clamp latitudes short of them
const MAX_LAT_DEG: f64 = 89.9;

const INVERSE_TOLERANCE_RAD: f64 = 1e-12;
const INVERSE_MAX_ITERATIONS: usize = 15;

fn eccentricity() -> f64 {
    (WGS84_FLATTENING * (2.0 - WGS84_FLATTENING)).sqrt()
}

/// Project geographic coordinates (degrees) to World Mercator meters
///
/// # Examples
/// ```
/// use rainraster::utils::{mercator_forward, mercator_inverse};
///
/// let (x, y) = mercator_forward(-0.1278, 51.5074);
/// let (lon, lat) = mercator_inverse(x, y);
/// assert!((lon + 0.1278).abs() < 1e-9);
/// assert!((lat - 51.5074).abs() < 1e-9);
/// ```
pub fn mercator_forward(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let e = eccentricity();
    let lambda = lon_deg.to_radians();
    let phi = lat_deg.clamp(-MAX_LAT_DEG, MAX_LAT_DEG).to_radians();

    let x = WGS84_SEMI_MAJOR_M * lambda;

    let es = e * phi.sin();
    let conformal = (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
        + (e / 2.0) * ((1.0 - es) / (1.0 + es)).ln();
    let y = WGS84_SEMI_MAJOR_M * conformal;

    (x, y)
}

/// Invert World Mercator meters back to geographic coordinates (degrees)
///
/// The latitude has no closed form; a fixed-point iteration on the
/// conformal latitude converges in a handful of rounds.
pub fn mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let e = eccentricity();
    let lambda = x / WGS84_SEMI_MAJOR_M;

    let t = (-y / WGS84_SEMI_MAJOR_M).exp();
    let mut phi = std::f64::consts::FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..INVERSE_MAX_ITERATIONS {
        let es = e * phi.sin();
        let next = std::f64::consts::FRAC_PI_2
            - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
        if (next - phi).abs() < INVERSE_TOLERANCE_RAD {
            phi = next;
            break;
        }
        phi = next;
    }

    (lambda.to_degrees(), phi.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_at_origin() {
        let (x, y) = mercator_forward(0.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_forward_antimeridian_easting() {
        let (x, _) = mercator_forward(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_forward_is_antisymmetric_in_latitude() {
        let (_, y_north) = mercator_forward(10.0, 45.0);
        let (_, y_south) = mercator_forward(10.0, -45.0);
        assert!((y_north + y_south).abs() < 1e-6);
        assert!(y_north > 0.0);
    }

    #[test]
    fn test_forward_monotonic_in_latitude() {
        let (_, y1) = mercator_forward(0.0, 10.0);
        let (_, y2) = mercator_forward(0.0, 20.0);
        let (_, y3) = mercator_forward(0.0, 60.0);
        assert!(y1 < y2);
        assert!(y2 < y3);
    }

    #[test]
    fn test_forward_finite_at_poles() {
        let (_, y) = mercator_forward(0.0, 90.0);
        assert!(y.is_finite());
        let (_, y) = mercator_forward(0.0, -90.0);
        assert!(y.is_finite());
    }

    #[test]
    fn test_roundtrip_various_points() {
        let points = [
            (-0.1278, 51.5074),
            (151.2093, -33.8688),
            (-73.9857, 40.7484),
            (0.0, 0.0),
            (179.5, 78.2),
            (-179.5, -78.2),
        ];

        for (lon, lat) in points {
            let (x, y) = mercator_forward(lon, lat);
            let (lon_back, lat_back) = mercator_inverse(x, y);
            assert!(
                (lon - lon_back).abs() < 1e-9,
                "longitude drifted for ({}, {})",
                lon,
                lat
            );
            assert!(
                (lat - lat_back).abs() < 1e-9,
                "latitude drifted for ({}, {})",
                lon,
                lat
            );
        }
    }
}
