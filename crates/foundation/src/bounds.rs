use serde::{Deserialize, Serialize};

use crate::math::LatLon;

/// Axis-aligned geographic box in degrees.
///
/// Boxes never cross the antimeridian: `west <= east` and `south <= north`
/// always hold for values built through [`GeoBox::from_corners`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::from_corners(LatLon::new(south, west), LatLon::new(north, east))
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_corners(a: LatLon, b: LatLon) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lon.min(b.lon),
            north: a.lat.max(b.lat),
            east: a.lon.max(b.lon),
        }
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    /// `true` if the box has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        !(self.north > self.south && self.east > self.west)
    }

    /// Inclusive containment. Degenerate boxes contain nothing.
    pub fn contains(&self, p: LatLon) -> bool {
        if self.is_degenerate() {
            return false;
        }
        p.lat >= self.south && p.lat <= self.north && p.lon >= self.west && p.lon <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBox;
    use crate::math::LatLon;

    #[test]
    fn corners_are_normalized() {
        let b = GeoBox::from_corners(LatLon::new(30.0, 80.0), LatLon::new(5.0, 50.0));
        assert_eq!(b, GeoBox { south: 5.0, west: 50.0, north: 30.0, east: 80.0 });
        assert_eq!(b.center(), LatLon::new(17.5, 65.0));
    }

    #[test]
    fn containment_is_inclusive() {
        let b = GeoBox::new(5.0, 50.0, 30.0, 80.0);
        assert!(b.contains(LatLon::new(5.0, 50.0)));
        assert!(b.contains(LatLon::new(30.0, 80.0)));
        assert!(!b.contains(LatLon::new(30.1, 65.0)));
    }

    #[test]
    fn degenerate_box_contains_nothing() {
        let b = GeoBox::new(10.0, 60.0, 10.0, 70.0);
        assert!(b.is_degenerate());
        assert!(!b.contains(LatLon::new(10.0, 65.0)));
    }
}
