use foundation::LatLon;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
pub const MAX_PITCH_DEG: f64 = 85.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub center: LatLon,
    pub zoom: f64,
    pub pitch_deg: f64,
}

impl CameraState {
    /// Camera with the center normalized and zoom/pitch clamped to renderer limits.
    pub fn new(center: LatLon, zoom: f64, pitch_deg: f64) -> Self {
        Self {
            center: LatLon::normalized(center.lat, center.lon),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pitch_deg: pitch_deg.clamp(0.0, MAX_PITCH_DEG),
        }
    }

    pub fn looking_at(&self, center: LatLon, zoom: f64) -> Self {
        Self::new(center, zoom, self.pitch_deg)
    }
}

impl Default for CameraState {
    /// Arabian Sea overview.
    fn default() -> Self {
        Self::new(LatLon::new(20.0, 65.0), 4.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraState, MAX_PITCH_DEG, MAX_ZOOM};
    use foundation::LatLon;

    #[test]
    fn new_clamps_zoom_and_pitch() {
        let c = CameraState::new(LatLon::new(0.0, 0.0), 40.0, 120.0);
        assert_eq!(c.zoom, MAX_ZOOM);
        assert_eq!(c.pitch_deg, MAX_PITCH_DEG);
    }

    #[test]
    fn looking_at_keeps_pitch() {
        let c = CameraState::new(LatLon::new(0.0, 0.0), 2.0, 30.0);
        let next = c.looking_at(LatLon::new(15.0, 88.0), 5.0);
        assert_eq!(next.pitch_deg, 30.0);
        assert_eq!(next.center, LatLon::new(15.0, 88.0));
    }
}
