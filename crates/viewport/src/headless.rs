//! In-process renderer with no drawing surface.
//!
//! Used by the CLI and tests. Every call is recorded on a shared
//! [`HeadlessSurface`] so callers can inspect what a real renderer would
//! have been asked to draw.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::{Future, poll_fn};
use std::rc::Rc;
use std::task::{Poll, Waker};

use dataset::FloatId;
use foundation::{LatLon, SpatialBound, haversine_m};

use crate::renderer::{
    Flight, FlightTicket, MapRenderer, Marker, MountRequest, RegionOutline, RendererError,
    RendererLoader,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Mount { container: String },
    FlyTo(FlightTicket),
    AddMarker(FloatId),
    RemoveMarker(FloatId),
    SetOverlay { visible: bool },
    SetOutlines { count: usize },
    Release,
}

#[derive(Debug, Default)]
struct SurfaceState {
    markers: BTreeMap<FloatId, Marker>,
    overlay: Option<SpatialBound>,
    outlines: Vec<RegionOutline>,
    flights: Vec<Flight>,
    calls: Vec<RenderCall>,
    created: usize,
    live: usize,
}

/// Shared inspection handle over everything headless renderers were asked to do.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    pub fn markers(&self) -> Vec<Marker> {
        self.state.borrow().markers.values().cloned().collect()
    }

    pub fn marker(&self, id: &FloatId) -> Option<Marker> {
        self.state.borrow().markers.get(id).cloned()
    }

    pub fn marker_count(&self) -> usize {
        self.state.borrow().markers.len()
    }

    pub fn overlay(&self) -> Option<SpatialBound> {
        self.state.borrow().overlay.clone()
    }

    pub fn outlines(&self) -> Vec<RegionOutline> {
        self.state.borrow().outlines.clone()
    }

    pub fn flights(&self) -> Vec<Flight> {
        self.state.borrow().flights.clone()
    }

    pub fn last_flight(&self) -> Option<Flight> {
        self.state.borrow().flights.last().cloned()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.borrow().calls.clone()
    }

    /// Renderers constructed so far, released or not.
    pub fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub fn live_instances(&self) -> usize {
        self.state.borrow().live
    }

    fn mount(&self, container: &str) -> HeadlessRenderer {
        let mut state = self.state.borrow_mut();
        state.created += 1;
        state.live += 1;
        state.calls.push(RenderCall::Mount {
            container: container.to_string(),
        });
        HeadlessRenderer {
            surface: self.clone(),
            released: false,
        }
    }
}

pub struct HeadlessRenderer {
    surface: HeadlessSurface,
    released: bool,
}

impl MapRenderer for HeadlessRenderer {
    fn fly_to(&mut self, flight: &Flight) {
        let mut state = self.surface.state.borrow_mut();
        state.calls.push(RenderCall::FlyTo(flight.ticket));
        state.flights.push(flight.clone());
    }

    fn add_marker(&mut self, marker: &Marker) {
        let mut state = self.surface.state.borrow_mut();
        state.calls.push(RenderCall::AddMarker(marker.id.clone()));
        state.markers.insert(marker.id.clone(), marker.clone());
    }

    fn remove_marker(&mut self, id: &FloatId) {
        let mut state = self.surface.state.borrow_mut();
        state.calls.push(RenderCall::RemoveMarker(id.clone()));
        state.markers.remove(id);
    }

    fn set_overlay(&mut self, overlay: Option<&SpatialBound>) {
        let mut state = self.surface.state.borrow_mut();
        state.calls.push(RenderCall::SetOverlay {
            visible: overlay.is_some(),
        });
        state.overlay = overlay.cloned();
    }

    fn set_outlines(&mut self, outlines: &[RegionOutline]) {
        let mut state = self.surface.state.borrow_mut();
        state.calls.push(RenderCall::SetOutlines {
            count: outlines.len(),
        });
        state.outlines = outlines.to_vec();
    }

    fn markers_at(&self, point: LatLon, tolerance_m: f64) -> Vec<FloatId> {
        self.surface
            .state
            .borrow()
            .markers
            .values()
            .filter(|m| haversine_m(m.position, point) <= tolerance_m)
            .map(|m| m.id.clone())
            .collect()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut state = self.surface.state.borrow_mut();
        state.live = state.live.saturating_sub(1);
        state.markers.clear();
        state.overlay = None;
        state.outlines.clear();
        state.calls.push(RenderCall::Release);
    }
}

impl Drop for HeadlessRenderer {
    fn drop(&mut self) {
        self.release();
    }
}

/// Holds a load until opened, so tests can interleave calls with a pending
/// initialization.
#[derive(Debug, Clone, Default)]
pub struct LoadGate {
    open: Rc<Cell<bool>>,
    waker: Rc<RefCell<Option<Waker>>>,
}

impl LoadGate {
    pub fn open(&self) {
        self.open.set(true);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    fn wait(&self) -> impl Future<Output = ()> + use<> {
        let open = Rc::clone(&self.open);
        let waker = Rc::clone(&self.waker);
        poll_fn(move |cx| {
            if open.get() {
                Poll::Ready(())
            } else {
                *waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        })
    }
}

/// Loader for [`HeadlessRenderer`]s.
///
/// Mirrors a tile-provider renderer: loading fails with
/// [`RendererError::MissingToken`] unless an access token is configured.
#[derive(Debug, Default)]
pub struct HeadlessLoader {
    token: RefCell<Option<String>>,
    gate: Option<LoadGate>,
    surface: HeadlessSurface,
}

impl HeadlessLoader {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
            ..Self::default()
        }
    }

    pub fn without_token() -> Self {
        Self::default()
    }

    /// Loader whose loads stay pending until the returned gate is opened.
    pub fn gated(token: impl Into<String>) -> (Self, LoadGate) {
        let gate = LoadGate::default();
        let loader = Self {
            gate: Some(gate.clone()),
            ..Self::with_token(token)
        };
        (loader, gate)
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.borrow_mut() = Some(token.into());
    }

    pub fn surface(&self) -> HeadlessSurface {
        self.surface.clone()
    }
}

impl RendererLoader for HeadlessLoader {
    type Renderer = HeadlessRenderer;

    fn load(
        &self,
        request: &MountRequest,
    ) -> impl Future<Output = Result<HeadlessRenderer, RendererError>> {
        let token = self.token.borrow().clone();
        let gate = self.gate.clone();
        let surface = self.surface.clone();
        let container = request.container.clone();
        async move {
            if let Some(gate) = gate {
                gate.wait().await;
            }
            match token {
                Some(t) if !t.trim().is_empty() => Ok(surface.mount(&container)),
                _ => Err(RendererError::MissingToken),
            }
        }
    }
}
