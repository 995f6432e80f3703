//! Dashboard session: wires filter criteria, region navigation and AOI
//! drawing to the float layer and the map viewport.

pub mod config;

use std::io::Write;

use catalog::{RegionCatalog, RegionDefinition};
use dataset::{DatasetError, ExportFormat, FloatDataset, FloatId, FloatRecord};
use foundation::{LatLon, SpatialBound};
use layers::{FilterCriteria, FloatLayerManager, LayerUpdate, apply_with_ceiling, nearest};
use scene::{AoiMode, AoiOutcome, AoiSelector, ProfileSink, SelectionBroker};
use tracing::{info, warn};
use viewport::{
    FlightTicket, FlyTo, MapViewport, MountRequest, RegionOutline, RendererLoader, ViewportError,
};

pub use config::{ConfigError, DashboardConfig};

pub const MAP_CONTAINER: &str = "map";

/// What a region button press did.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionNavigation {
    Flying(FlyTo),
    /// `custom` means "draw your own AOI"; the camera stays put.
    Custom,
    /// Unknown id; the camera is unchanged.
    Unknown(String),
    MapUnavailable(ViewportError),
}

pub struct DashboardSession<L: RendererLoader, S: ProfileSink> {
    config: DashboardConfig,
    catalog: RegionCatalog,
    dataset: FloatDataset,
    viewport: MapViewport<L>,
    layer: FloatLayerManager,
    aoi: AoiSelector,
    broker: SelectionBroker<S>,
    criteria: FilterCriteria,
    visible: Vec<FloatRecord>,
}

impl<L: RendererLoader, S: ProfileSink> DashboardSession<L, S> {
    pub fn new(
        config: DashboardConfig,
        catalog: RegionCatalog,
        dataset: FloatDataset,
        loader: L,
        sink: S,
    ) -> Self {
        let issues = dataset
            .records()
            .iter()
            .filter(|r| !r.validate(config.depth_ceiling_m).is_empty())
            .count();
        info!(floats = dataset.len(), flagged = issues, "dashboard session created");

        let viewport = MapViewport::new(loader);
        viewport.set_outlines(outlines(&catalog));
        let mut session = Self {
            config,
            catalog,
            dataset,
            viewport,
            layer: FloatLayerManager::new(),
            aoi: AoiSelector::new(),
            broker: SelectionBroker::new(sink),
            criteria: FilterCriteria::default(),
            visible: Vec::new(),
        };
        session.refilter();
        session
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn dataset(&self) -> &FloatDataset {
        &self.dataset
    }

    pub fn viewport(&self) -> &MapViewport<L> {
        &self.viewport
    }

    pub fn layer(&self) -> &FloatLayerManager {
        &self.layer
    }

    pub fn aoi(&self) -> &AoiSelector {
        &self.aoi
    }

    pub fn broker(&self) -> &SelectionBroker<S> {
        &self.broker
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn visible(&self) -> &[FloatRecord] {
        &self.visible
    }

    /// Mount the map, then flush markers queued while it loaded.
    pub async fn mount(&mut self) -> Result<(), ViewportError> {
        let request = MountRequest {
            container: MAP_CONTAINER.to_string(),
            camera: self.config.camera(),
        };
        self.viewport.initialize(request).await?;
        self.layer.on_viewport_ready(&self.viewport);
        Ok(())
    }

    pub fn teardown(&self) {
        self.viewport.teardown();
    }

    /// New criteria from the filter sidebar.
    ///
    /// The sidebar has no spatial control, so a committed AOI stays in effect
    /// when `criteria` carries no bound. [`DashboardSession::clear_aoi`]
    /// removes it.
    pub fn set_criteria(&mut self, mut criteria: FilterCriteria) -> LayerUpdate {
        if criteria.spatial_bound.is_none() {
            criteria.spatial_bound = self.aoi.committed().cloned();
        }
        self.criteria = criteria;
        self.refilter()
    }

    fn refilter(&mut self) -> LayerUpdate {
        self.visible = apply_with_ceiling(
            self.dataset.records(),
            &self.criteria,
            self.config.depth_ceiling_m,
        );
        self.layer.set_visible(self.visible.clone(), &self.viewport)
    }

    pub fn select_region(&mut self, id: &str) -> RegionNavigation {
        let region = match self.catalog.resolve(id) {
            Ok(region) => region,
            Err(e) => {
                warn!("{e}; camera unchanged");
                return RegionNavigation::Unknown(id.to_string());
            }
        };
        if region.is_custom() {
            return RegionNavigation::Custom;
        }
        match self
            .viewport
            .fly_to(region.center, region.zoom, self.config.fly_duration_ms)
        {
            Ok(fly) => RegionNavigation::Flying(fly),
            Err(e) => RegionNavigation::MapUnavailable(e),
        }
    }

    /// Restrict visible floats to a region's study-area outline. A committed
    /// AOI is cleared first.
    ///
    /// Returns the region, or `None` when it is unknown or has no outline.
    pub fn restrict_to_region(&mut self, id: &str) -> Option<RegionDefinition> {
        let region = self.catalog.resolve(id).ok()?.clone();
        let bounds = region.bounds?;
        self.aoi.clear(&self.viewport);
        let criteria = FilterCriteria {
            spatial_bound: Some(SpatialBound::Rectangle(bounds)),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
        Some(region)
    }

    /// Renderer callback for a finished camera animation.
    pub fn complete_flight(&self, ticket: FlightTicket) -> bool {
        self.viewport.complete_flight(ticket)
    }

    pub fn set_aoi_mode(&mut self, mode: AoiMode) {
        self.aoi.set_mode(mode, &self.viewport);
    }

    pub fn pointer_down(&mut self, point: LatLon) {
        self.aoi.press(point, &self.viewport);
    }

    pub fn pointer_move(&mut self, point: LatLon) {
        self.aoi.move_to(point, &self.viewport);
    }

    /// Finish the AOI gesture; a committed bound becomes the spatial filter.
    pub fn pointer_up(&mut self, point: LatLon) -> Option<SpatialBound> {
        let AoiOutcome::Committed(bound) = self.aoi.release(point, &self.viewport)? else {
            return None;
        };
        let criteria = FilterCriteria {
            spatial_bound: Some(bound.clone()),
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
        Some(bound)
    }

    pub fn cancel_aoi(&mut self) {
        self.aoi.cancel(&self.viewport);
    }

    pub fn clear_aoi(&mut self) {
        self.aoi.clear(&self.viewport);
        let criteria = FilterCriteria {
            spatial_bound: None,
            ..self.criteria.clone()
        };
        self.set_criteria(criteria);
    }

    /// Click on the map; the topmost marker under the pointer is selected.
    pub fn click(&mut self, point: LatLon) -> Option<FloatId> {
        self.layer.click_at(
            point,
            self.config.click_tolerance_m,
            &self.viewport,
            &mut self.broker,
        )
    }

    pub fn popup_text(&self, id: &FloatId) -> Option<String> {
        self.layer.popup_text(id)
    }

    /// Popup of the first region outline (by id) containing `point`.
    pub fn region_popup_at(&self, point: LatLon) -> Option<String> {
        self.viewport
            .outlines()
            .into_iter()
            .find(|o| o.bounds.contains(point))
            .map(|o| o.popup)
    }

    /// Visible floats closest to `point`.
    pub fn nearest(&self, point: LatLon, k: usize) -> Vec<(f64, FloatRecord)> {
        nearest(&self.visible, point, k)
    }

    /// Write the visible floats with the enabled variable columns.
    ///
    /// Returns the number of rows written.
    pub fn export<W: Write>(
        &self,
        format: ExportFormat,
        mut out: W,
    ) -> Result<usize, DatasetError> {
        let variables: Vec<_> = self.criteria.enabled_variables.iter().copied().collect();
        match format {
            ExportFormat::Csv => dataset::write_csv(out, &self.visible, &variables)?,
            ExportFormat::Json => {
                let value = dataset::to_json(&self.visible, &variables);
                serde_json::to_writer_pretty(&mut out, &value)
                    .map_err(|e| DatasetError::Export(e.to_string()))?;
                writeln!(out).map_err(|e| DatasetError::Export(e.to_string()))?;
            }
        }
        Ok(self.visible.len())
    }

    pub fn into_sink(self) -> S {
        self.broker.into_sink()
    }
}

fn outlines(catalog: &RegionCatalog) -> Vec<RegionOutline> {
    catalog
        .outlined()
        .map(|(region, bounds)| RegionOutline {
            id: region.id.clone(),
            bounds,
            popup: match &region.description {
                Some(d) => format!("{}\n{d}", region.label),
                None => region.label.clone(),
            },
        })
        .collect()
}
