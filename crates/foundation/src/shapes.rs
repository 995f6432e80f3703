use serde::{Deserialize, Serialize};

use crate::bounds::GeoBox;
use crate::math::{LatLon, haversine_m};

/// Circle on the sphere: all points within `radius_m` great-circle meters of `center`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCircle {
    pub center: LatLon,
    pub radius_m: f64,
}

impl GeoCircle {
    pub fn new(center: LatLon, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// Circle centered on `center` passing through `rim`.
    pub fn through(center: LatLon, rim: LatLon) -> Self {
        Self::new(center, haversine_m(center, rim))
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.radius_m.is_finite() && self.radius_m > 0.0)
    }

    pub fn contains(&self, p: LatLon) -> bool {
        if self.is_degenerate() {
            return false;
        }
        haversine_m(self.center, p) <= self.radius_m
    }
}

/// Simple polygon in lon/lat space (single outer ring, no holes).
///
/// A closing vertex equal to the first one is accepted and ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub vertices: Vec<LatLon>,
}

impl GeoPolygon {
    pub fn new(vertices: Vec<LatLon>) -> Self {
        Self { vertices }
    }

    fn ring(&self) -> &[LatLon] {
        let v = &self.vertices;
        if v.len() >= 2 && v[0] == v[v.len() - 1] {
            &v[..v.len() - 1]
        } else {
            v
        }
    }

    /// Shoelace area in square degrees (always non-negative).
    pub fn planar_area_deg2(&self) -> f64 {
        let ring = self.ring();
        if ring.len() < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            acc += a.lon * b.lat - b.lon * a.lat;
        }
        (acc * 0.5).abs()
    }

    pub fn is_degenerate(&self) -> bool {
        self.planar_area_deg2() <= 0.0
    }

    /// Even-odd ray casting with longitude as x and latitude as y.
    pub fn contains(&self, p: LatLon) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let ring = self.ring();
        let mut inside = false;
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[j]);
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let x = (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon;
                if p.lon < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialBoundKind {
    Rectangle,
    Circle,
    Polygon,
}

/// Spatial restriction applied to float positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialBound {
    Rectangle(GeoBox),
    Circle(GeoCircle),
    Polygon(GeoPolygon),
}

impl SpatialBound {
    pub fn kind(&self) -> SpatialBoundKind {
        match self {
            SpatialBound::Rectangle(_) => SpatialBoundKind::Rectangle,
            SpatialBound::Circle(_) => SpatialBoundKind::Circle,
            SpatialBound::Polygon(_) => SpatialBoundKind::Polygon,
        }
    }

    /// Zero-area bounds admit no point.
    pub fn is_degenerate(&self) -> bool {
        match self {
            SpatialBound::Rectangle(b) => b.is_degenerate(),
            SpatialBound::Circle(c) => c.is_degenerate(),
            SpatialBound::Polygon(p) => p.is_degenerate(),
        }
    }

    pub fn contains(&self, p: LatLon) -> bool {
        match self {
            SpatialBound::Rectangle(b) => b.contains(p),
            SpatialBound::Circle(c) => c.contains(p),
            SpatialBound::Polygon(poly) => poly.contains(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoCircle, GeoPolygon, SpatialBound, SpatialBoundKind};
    use crate::bounds::GeoBox;
    use crate::math::LatLon;

    fn arabian_sea_ring() -> GeoPolygon {
        GeoPolygon::new(vec![
            LatLon::new(5.0, 50.0),
            LatLon::new(5.0, 80.0),
            LatLon::new(30.0, 80.0),
            LatLon::new(30.0, 50.0),
            LatLon::new(5.0, 50.0),
        ])
    }

    #[test]
    fn polygon_contains_interior_point_only() {
        let poly = arabian_sea_ring();
        assert!(poly.contains(LatLon::new(17.5, 65.0)));
        assert!(!poly.contains(LatLon::new(15.0, 88.0)));
        assert_eq!(poly.planar_area_deg2(), 25.0 * 30.0);
    }

    #[test]
    fn collinear_polygon_is_degenerate() {
        let poly = GeoPolygon::new(vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(1.0, 1.0),
            LatLon::new(2.0, 2.0),
        ]);
        assert!(poly.is_degenerate());
        assert!(!poly.contains(LatLon::new(1.0, 1.0)));
    }

    #[test]
    fn circle_through_rim_contains_rim() {
        let c = GeoCircle::through(LatLon::new(10.0, 75.0), LatLon::new(12.0, 75.0));
        assert!(c.contains(LatLon::new(12.0, 75.0)));
        assert!(c.contains(LatLon::new(11.0, 75.5)));
        assert!(!c.contains(LatLon::new(13.0, 75.0)));
    }

    #[test]
    fn zero_radius_circle_contains_nothing() {
        let p = LatLon::new(10.0, 75.0);
        let c = GeoCircle::through(p, p);
        assert!(SpatialBound::Circle(c).is_degenerate());
        assert!(!c.contains(p));
    }

    #[test]
    fn bound_serializes_with_kind_tag() {
        let bound = SpatialBound::Rectangle(GeoBox::new(5.0, 50.0, 30.0, 80.0));
        assert_eq!(bound.kind(), SpatialBoundKind::Rectangle);
        let json = serde_json::to_string(&bound).unwrap();
        assert!(json.contains("\"kind\":\"rectangle\""));
        let back: SpatialBound = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bound);
    }
}
