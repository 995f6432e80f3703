use serde::{Deserialize, Serialize};

/// Mean Earth radius (meters), IUGG.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Geographic position in degrees.
///
/// Convention: `lat` in [-90, 90], `lon` in [-180, 180]. Values outside those
/// ranges are representable but rejected by [`LatLon::is_valid`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Clamp latitude to the poles and wrap longitude into [-180, 180].
    pub fn normalized(lat: f64, lon: f64) -> Self {
        let lat = lat.clamp(-90.0, 90.0);
        let lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Great-circle distance in meters (haversine on the mean sphere).
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda * 0.5).sin().powi(2);
    // Rounding can push `h` marginally above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::{EARTH_MEAN_RADIUS_M, LatLon, haversine_m};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = LatLon::new(17.5, 65.0);
        assert_close(haversine_m(p, p), 0.0, 1e-9);
    }

    #[test]
    fn one_degree_along_equator() {
        let d = haversine_m(LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0));
        let expected = EARTH_MEAN_RADIUS_M * 1f64.to_radians();
        assert_close(d, expected, 1e-6);
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let d = haversine_m(LatLon::new(0.0, 0.0), LatLon::new(0.0, 180.0));
        assert_close(d, std::f64::consts::PI * EARTH_MEAN_RADIUS_M, 1e-3);
    }

    #[test]
    fn normalized_wraps_longitude_and_clamps_latitude() {
        let p = LatLon::normalized(95.0, 190.0);
        assert_close(p.lat, 90.0, 1e-12);
        assert_close(p.lon, -170.0, 1e-12);
        assert!(p.is_valid());
    }

    #[test]
    fn validity_rejects_out_of_range() {
        assert!(LatLon::new(-90.0, 180.0).is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(!LatLon::new(0.0, f64::NAN).is_valid());
    }
}
