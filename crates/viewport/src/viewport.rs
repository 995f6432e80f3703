use std::cell::RefCell;
use std::fmt;
use std::future::Future;

use dataset::FloatId;
use foundation::{Generation, Handle, LatLon, SpatialBound};
use runtime::{Event, EventBus};
use tracing::{debug, info, warn};

use crate::camera::CameraState;
use crate::renderer::{
    Flight, FlightTicket, MapRenderer, MarkerOp, MountRequest, RegionOutline, RendererError,
    RendererLoader,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportStatus {
    Unmounted,
    Initializing,
    Ready,
    /// Renderer failed to load; `initialize` may be called again.
    Unavailable(String),
    TornDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    Ready { generation: Generation },
    Unavailable { reason: String },
    FlightStarted { ticket: FlightTicket, target: CameraState },
    FlightCompleted { ticket: FlightTicket, camera: CameraState },
    StaleDiscarded { operation: &'static str },
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    AlreadyInitializing,
    NotReady,
    Unavailable(RendererError),
    /// A teardown (or newer mount) happened while this operation was pending.
    Cancelled,
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::AlreadyInitializing => write!(f, "already initializing"),
            ViewportError::NotReady => write!(f, "map viewport not ready"),
            ViewportError::Unavailable(e) => write!(f, "map unavailable: {e}"),
            ViewportError::Cancelled => write!(f, "viewport operation cancelled"),
        }
    }
}

impl std::error::Error for ViewportError {}

/// Outcome of a fly-to request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlyTo {
    Started(FlightTicket),
    /// Held until the renderer is ready; only the latest queued request survives.
    Queued,
}

/// Degraded rendering shown instead of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub message: String,
    pub retry: bool,
}

struct Inner<R> {
    status: ViewportStatus,
    generation: Generation,
    renderer: Option<R>,
    camera: CameraState,
    /// Survives remounts; pushed to every new renderer.
    outlines: Vec<RegionOutline>,
    queued_flight: Option<(CameraState, u32)>,
    active_flight: Option<(FlightTicket, CameraState)>,
    next_flight: u64,
    events: EventBus<ViewportEvent>,
}

impl<R: MapRenderer> Inner<R> {
    fn start_flight(&mut self, target: CameraState, duration_ms: u32) -> Option<FlightTicket> {
        let renderer = self.renderer.as_mut()?;
        let ticket = Handle::new(self.next_flight, self.generation);
        self.next_flight += 1;
        renderer.fly_to(&Flight {
            ticket,
            target,
            duration_ms,
        });
        if let Some((superseded, _)) = self.active_flight.replace((ticket, target)) {
            debug!(flight = superseded.sequence(), "flight superseded by a newer fly-to");
        }
        self.events.emit(ViewportEvent::FlightStarted { ticket, target });
        Some(ticket)
    }

    fn discard(&mut self, operation: &'static str) {
        debug!(operation, generation = self.generation.value(), "stale operation discarded");
        self.events.emit(ViewportEvent::StaleDiscarded { operation });
    }
}

/// Owns exactly one renderer per mounted session.
///
/// All methods take `&self`: the viewport lives on a single UI thread and is
/// shared by the layer manager and the AOI selector. No `RefCell` borrow is
/// held across an `.await`.
///
/// Lifecycle contract:
/// - `initialize` while a previous one is pending fails with
///   [`ViewportError::AlreadyInitializing`] and never loads a second renderer.
/// - `teardown` bumps the generation; completions issued under an older
///   generation are dropped without touching the camera.
/// - Dropping the viewport releases the renderer.
pub struct MapViewport<L: RendererLoader> {
    loader: L,
    inner: RefCell<Inner<L::Renderer>>,
}

impl<L: RendererLoader> MapViewport<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            inner: RefCell::new(Inner {
                status: ViewportStatus::Unmounted,
                generation: Generation::ZERO,
                renderer: None,
                camera: CameraState::default(),
                outlines: Vec::new(),
                queued_flight: None,
                active_flight: None,
                next_flight: 0,
                events: EventBus::new(),
            }),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn status(&self) -> ViewportStatus {
        self.inner.borrow().status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.borrow().status == ViewportStatus::Ready
    }

    pub fn generation(&self) -> Generation {
        self.inner.borrow().generation
    }

    pub fn camera(&self) -> CameraState {
        self.inner.borrow().camera
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        let (message, retry) = match &self.inner.borrow().status {
            ViewportStatus::Ready => return None,
            ViewportStatus::Initializing => ("Loading map…".to_string(), false),
            ViewportStatus::Unavailable(reason) => (format!("Map unavailable: {reason}"), true),
            ViewportStatus::Unmounted | ViewportStatus::TornDown => {
                ("Map not mounted".to_string(), true)
            }
        };
        Some(Placeholder { message, retry })
    }

    /// Mount a renderer.
    ///
    /// The "already initializing" check runs when this is called, not when
    /// the returned future is first polled. Calling it on a ready viewport is
    /// a no-op.
    pub fn initialize(
        &self,
        request: MountRequest,
    ) -> impl Future<Output = Result<(), ViewportError>> + '_ {
        let started = self.begin_initialize(&request);
        async move {
            let Some(generation) = started? else {
                return Ok(());
            };
            let loaded = self.loader.load(&request).await;
            self.finish_initialize(generation, loaded)
        }
    }

    fn begin_initialize(
        &self,
        request: &MountRequest,
    ) -> Result<Option<Generation>, ViewportError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match inner.status {
            ViewportStatus::Initializing => {
                debug!("initialize rejected: already initializing");
                Err(ViewportError::AlreadyInitializing)
            }
            ViewportStatus::Ready => {
                debug!("initialize ignored: renderer already mounted");
                Ok(None)
            }
            _ => {
                inner.status = ViewportStatus::Initializing;
                inner.camera = request.camera;
                let generation = inner.generation.bump();
                info!(
                    container = %request.container,
                    generation = generation.value(),
                    "mounting map renderer"
                );
                Ok(Some(generation))
            }
        }
    }

    fn finish_initialize(
        &self,
        generation: Generation,
        loaded: Result<L::Renderer, RendererError>,
    ) -> Result<(), ViewportError> {
        let mut inner = self.inner.borrow_mut();
        if inner.generation != generation || inner.status != ViewportStatus::Initializing {
            if let Ok(mut renderer) = loaded {
                renderer.release();
            }
            inner.discard("initialize");
            return Err(ViewportError::Cancelled);
        }

        match loaded {
            Ok(mut renderer) => {
                if !inner.outlines.is_empty() {
                    renderer.set_outlines(&inner.outlines);
                }
                inner.renderer = Some(renderer);
                inner.status = ViewportStatus::Ready;
                inner.events.emit(ViewportEvent::Ready { generation });
                info!(generation = generation.value(), "map renderer ready");
                if let Some((target, duration_ms)) = inner.queued_flight.take() {
                    inner.start_flight(target, duration_ms);
                }
                Ok(())
            }
            Err(e) => {
                warn!("map renderer failed to load: {e}");
                inner.status = ViewportStatus::Unavailable(e.to_string());
                inner.queued_flight = None;
                inner.events.emit(ViewportEvent::Unavailable {
                    reason: e.to_string(),
                });
                Err(ViewportError::Unavailable(e))
            }
        }
    }

    /// Animate the camera. Completion arrives via [`MapViewport::complete_flight`].
    pub fn fly_to(
        &self,
        center: LatLon,
        zoom: f64,
        duration_ms: u32,
    ) -> Result<FlyTo, ViewportError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let target = inner.camera.looking_at(center, zoom);
        match inner.status {
            ViewportStatus::Ready => inner
                .start_flight(target, duration_ms)
                .map(FlyTo::Started)
                .ok_or(ViewportError::NotReady),
            ViewportStatus::Initializing => {
                if inner.queued_flight.replace((target, duration_ms)).is_some() {
                    debug!("queued fly-to replaced by a newer one");
                }
                Ok(FlyTo::Queued)
            }
            _ => Err(ViewportError::NotReady),
        }
    }

    /// Renderer callback: the animation for `ticket` finished.
    ///
    /// Returns `true` if the camera was updated. Completions from an older
    /// generation, a superseded flight, or after teardown are discarded.
    pub fn complete_flight(&self, ticket: FlightTicket) -> bool {
        let mut inner = self.inner.borrow_mut();
        let current = inner.status == ViewportStatus::Ready
            && ticket.generation() == inner.generation
            && inner.active_flight.is_some_and(|(t, _)| t == ticket);
        if !current {
            inner.discard("fly_to");
            return false;
        }
        if let Some((_, camera)) = inner.active_flight.take() {
            inner.camera = camera;
            inner.events.emit(ViewportEvent::FlightCompleted { ticket, camera });
        }
        true
    }

    /// Apply marker operations to the live renderer.
    ///
    /// Returns the generation the operations were applied under.
    pub fn apply_marker_ops(&self, ops: &[MarkerOp]) -> Result<Generation, ViewportError> {
        let mut inner = self.inner.borrow_mut();
        if inner.status != ViewportStatus::Ready {
            return Err(ViewportError::NotReady);
        }
        let generation = inner.generation;
        let renderer = inner.renderer.as_mut().ok_or(ViewportError::NotReady)?;
        for op in ops {
            match op {
                MarkerOp::Add(marker) => renderer.add_marker(marker),
                MarkerOp::Remove(id) => renderer.remove_marker(id),
            }
        }
        Ok(generation)
    }

    /// Show (or clear) the AOI overlay.
    pub fn set_overlay(&self, overlay: Option<&SpatialBound>) -> Result<(), ViewportError> {
        let mut inner = self.inner.borrow_mut();
        if inner.status != ViewportStatus::Ready {
            return Err(ViewportError::NotReady);
        }
        let renderer = inner.renderer.as_mut().ok_or(ViewportError::NotReady)?;
        renderer.set_overlay(overlay);
        Ok(())
    }

    /// Replace the region outline layer.
    ///
    /// Accepted in any state; the outlines are drawn now if a renderer is
    /// mounted and again on every later mount.
    pub fn set_outlines(&self, outlines: Vec<RegionOutline>) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.outlines = outlines;
        if let Some(renderer) = inner.renderer.as_mut() {
            renderer.set_outlines(&inner.outlines);
        }
    }

    pub fn outlines(&self) -> Vec<RegionOutline> {
        self.inner.borrow().outlines.clone()
    }

    /// Ids of markers under `point`; click delegation for the marker layer.
    pub fn pick_markers(
        &self,
        point: LatLon,
        tolerance_m: f64,
    ) -> Result<Vec<FloatId>, ViewportError> {
        let inner = self.inner.borrow();
        match (&inner.status, inner.renderer.as_ref()) {
            (ViewportStatus::Ready, Some(renderer)) => Ok(renderer.markers_at(point, tolerance_m)),
            _ => Err(ViewportError::NotReady),
        }
    }

    /// Release the renderer. Calling it again is a no-op.
    pub fn teardown(&self) {
        let mut inner = self.inner.borrow_mut();
        if matches!(
            inner.status,
            ViewportStatus::Unmounted | ViewportStatus::TornDown
        ) {
            return;
        }
        if let Some(mut renderer) = inner.renderer.take() {
            renderer.release();
        }
        inner.generation.bump();
        inner.queued_flight = None;
        inner.active_flight = None;
        inner.status = ViewportStatus::TornDown;
        inner.events.emit(ViewportEvent::TornDown);
        info!(generation = inner.generation.value(), "map renderer torn down");
    }

    pub fn drain_events(&self) -> Vec<Event<ViewportEvent>> {
        self.inner.borrow_mut().events.drain()
    }
}

impl<L: RendererLoader> Drop for MapViewport<L> {
    fn drop(&mut self) {
        self.teardown();
    }
}
