use foundation::{GeoBox, GeoCircle, LatLon, SpatialBound};
use serde::{Deserialize, Serialize};
use tracing::debug;
use viewport::{MapViewport, RendererLoader};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoiMode {
    #[default]
    None,
    Rectangle,
    Circle,
}

impl AoiMode {
    pub fn is_drawing_mode(self) -> bool {
        self != AoiMode::None
    }
}

/// An in-progress gesture: anchor set on press, `current` follows the pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Gesture {
    pub mode: AoiMode,
    pub anchor: LatLon,
    pub current: LatLon,
}

impl Gesture {
    /// Geometry spanned by the anchor and `to`.
    pub fn geometry(&self, to: LatLon) -> Option<SpatialBound> {
        match self.mode {
            AoiMode::None => None,
            AoiMode::Rectangle => {
                Some(SpatialBound::Rectangle(GeoBox::from_corners(self.anchor, to)))
            }
            AoiMode::Circle => Some(SpatialBound::Circle(GeoCircle::through(self.anchor, to))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AoiState {
    Idle,
    Drawing(Gesture),
}

/// Terminal outcome of a gesture. Both return the selector to `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum AoiOutcome {
    Committed(SpatialBound),
    Cancelled,
}

/// Area-of-interest drawing state machine.
///
/// `Idle → Drawing → (Committed | Cancelled) → Idle`. At most one gesture is
/// active; pressing again while drawing cancels the current one first. The
/// committed geometry depends only on the anchor and the release point.
///
/// The preview is drawn through the viewport's overlay; when the viewport is
/// not ready the preview is skipped and the state machine is unaffected.
#[derive(Debug, Default)]
pub struct AoiSelector {
    mode: AoiMode,
    gesture: Option<Gesture>,
    /// Last committed geometry; restored as overlay when a gesture is cancelled.
    committed: Option<SpatialBound>,
}

impl AoiSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AoiMode {
        self.mode
    }

    pub fn state(&self) -> AoiState {
        match self.gesture {
            Some(g) => AoiState::Drawing(g),
            None => AoiState::Idle,
        }
    }

    pub fn committed(&self) -> Option<&SpatialBound> {
        self.committed.as_ref()
    }

    /// Live preview geometry, if drawing.
    pub fn preview(&self) -> Option<SpatialBound> {
        self.gesture.and_then(|g| g.geometry(g.current))
    }

    /// Switch draw mode. Switching away from the active gesture's mode cancels it.
    pub fn set_mode<L: RendererLoader>(
        &mut self,
        mode: AoiMode,
        viewport: &MapViewport<L>,
    ) -> Option<AoiOutcome> {
        self.mode = mode;
        if self.gesture.is_some_and(|g| g.mode != mode) {
            return Some(self.cancel(viewport));
        }
        None
    }

    /// Pointer down. Starts a gesture in a draw mode; ignored in `None`.
    ///
    /// Returns the outcome of a gesture that had to be cancelled first.
    pub fn press<L: RendererLoader>(
        &mut self,
        point: LatLon,
        viewport: &MapViewport<L>,
    ) -> Option<AoiOutcome> {
        if !self.mode.is_drawing_mode() {
            return None;
        }
        let previous = self.gesture.is_some().then(|| self.cancel(viewport));
        let gesture = Gesture {
            mode: self.mode,
            anchor: point,
            current: point,
        };
        self.gesture = Some(gesture);
        debug!(mode = ?self.mode, lat = point.lat, lon = point.lon, "aoi gesture started");
        show(viewport, gesture.geometry(point).as_ref());
        previous
    }

    /// Pointer move. Only updates the preview.
    pub fn move_to<L: RendererLoader>(&mut self, point: LatLon, viewport: &MapViewport<L>) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.current = point;
        let preview = gesture.geometry(point);
        show(viewport, preview.as_ref());
    }

    /// Pointer up. Commits the geometry spanned by the anchor and `point`.
    pub fn release<L: RendererLoader>(
        &mut self,
        point: LatLon,
        viewport: &MapViewport<L>,
    ) -> Option<AoiOutcome> {
        let gesture = self.gesture.take()?;
        let bound = gesture.geometry(point)?;
        debug!(kind = ?bound.kind(), degenerate = bound.is_degenerate(), "aoi committed");
        show(viewport, Some(&bound));
        self.committed = Some(bound.clone());
        Some(AoiOutcome::Committed(bound))
    }

    /// Abandon the active gesture. No geometry is emitted and the previous
    /// committed bound stays in effect.
    pub fn cancel<L: RendererLoader>(&mut self, viewport: &MapViewport<L>) -> AoiOutcome {
        if self.gesture.take().is_some() {
            debug!("aoi gesture cancelled");
            show(viewport, self.committed.as_ref());
        }
        AoiOutcome::Cancelled
    }

    /// Forget the committed bound and clear the overlay.
    pub fn clear<L: RendererLoader>(&mut self, viewport: &MapViewport<L>) {
        self.gesture = None;
        self.committed = None;
        show(viewport, None);
    }
}

fn show<L: RendererLoader>(viewport: &MapViewport<L>, overlay: Option<&SpatialBound>) {
    if let Err(e) = viewport.set_overlay(overlay) {
        debug!("aoi overlay skipped: {e}");
    }
}
