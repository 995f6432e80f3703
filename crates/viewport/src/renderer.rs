use std::fmt;
use std::future::Future;

use dataset::FloatId;
use foundation::{GeoBox, Handle, LatLon, SpatialBound};

use crate::camera::CameraState;

/// Identifies one fly-to request: `(flight sequence, viewport generation)`.
pub type FlightTicket = Handle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Per-point paint properties.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub radius_px: f32,
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub stroke: Rgb,
    pub stroke_weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: FloatId,
    pub position: LatLon,
    pub style: MarkerStyle,
    /// Draw order; higher values are drawn on top.
    pub z_order: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerOp {
    Add(Marker),
    Remove(FloatId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub ticket: FlightTicket,
    pub target: CameraState,
    pub duration_ms: u32,
}

/// Fixed study-area outline drawn beneath the markers, independent of the AOI
/// overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOutline {
    pub id: String,
    pub bounds: GeoBox,
    pub popup: String,
}

/// What the host needs to mount a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MountRequest {
    /// Host element / surface identifier.
    pub container: String,
    pub camera: CameraState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    MissingToken,
    Network(String),
    Unsupported(String),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererError::MissingToken => write!(f, "map access token missing"),
            RendererError::Network(msg) => write!(f, "map tiles unreachable: {msg}"),
            RendererError::Unsupported(msg) => write!(f, "renderer unsupported: {msg}"),
        }
    }
}

impl std::error::Error for RendererError {}

/// A live map rendering surface.
///
/// Requirements on implementors:
/// - `fly_to` starts an animation and returns immediately; completion is
///   reported back through `MapViewport::complete_flight`.
/// - marker paint comes from `Marker::style`; click/hover delegation is scoped
///   to the marker layer.
/// - `release` frees every resource; the instance is never used afterwards.
pub trait MapRenderer {
    fn fly_to(&mut self, flight: &Flight);
    fn add_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self, id: &FloatId);
    fn set_overlay(&mut self, overlay: Option<&SpatialBound>);
    /// Replace the region outline layer.
    fn set_outlines(&mut self, outlines: &[RegionOutline]);
    /// Markers within `tolerance_m` of `point`, in any order.
    fn markers_at(&self, point: LatLon, tolerance_m: f64) -> Vec<FloatId>;
    fn release(&mut self);
}

/// Asynchronously produces renderer instances.
pub trait RendererLoader {
    type Renderer: MapRenderer;

    fn load(
        &self,
        request: &MountRequest,
    ) -> impl Future<Output = Result<Self::Renderer, RendererError>>;
}
