use std::collections::{BTreeMap, BTreeSet};

use dataset::{FloatId, FloatRecord};
use foundation::{Generation, LatLon, haversine_m};
use runtime::{Metrics, names};
use scene::{MarkerHit, ProfileSink, SelectionBroker, topmost};
use tracing::debug;
use viewport::{MapViewport, Marker, MarkerOp, RendererLoader};

use crate::symbology::style_for;

/// Minimal change set between two visible sets, keyed by record id.
///
/// A record whose id survives but whose contents changed counts as removed
/// and re-added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerDiff {
    /// In `next` order.
    pub added: Vec<FloatRecord>,
    /// Sorted by id.
    pub removed: Vec<FloatId>,
    pub unchanged: usize,
}

impl LayerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn reconcile<'a>(
    previous: impl IntoIterator<Item = &'a FloatRecord>,
    next: impl IntoIterator<Item = &'a FloatRecord>,
) -> LayerDiff {
    let previous: BTreeMap<&FloatId, &FloatRecord> =
        previous.into_iter().map(|r| (&r.id, r)).collect();

    let mut diff = LayerDiff::default();
    let mut kept: BTreeSet<&FloatId> = BTreeSet::new();
    let mut seen: BTreeSet<&FloatId> = BTreeSet::new();

    for record in next {
        if !seen.insert(&record.id) {
            continue;
        }
        match previous.get(&record.id) {
            Some(prev) if *prev == record => {
                kept.insert(&record.id);
                diff.unchanged += 1;
            }
            _ => diff.added.push(record.clone()),
        }
    }

    diff.removed = previous
        .keys()
        .filter(|id| !kept.contains(*id))
        .map(|id| (*id).clone())
        .collect();
    diff
}

/// Result of pushing a new visible set.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerUpdate {
    Flushed(LayerDiff),
    /// Viewport not ready; the set is held until [`FloatLayerManager::on_viewport_ready`].
    Queued,
}

#[derive(Debug, Clone)]
struct RenderedMarker {
    record: FloatRecord,
    z_order: u64,
}

/// Keeps the viewport's marker layer equal to the latest visible set.
///
/// - Only the newest pending set is kept (last write wins).
/// - Markers are drawn in insertion order; each added marker gets the next
///   z-order, so the last-added marker is topmost.
/// - When the viewport's generation changes (a new renderer was mounted) the
///   layer is re-rendered from scratch on the next flush.
#[derive(Debug, Default)]
pub struct FloatLayerManager {
    rendered: BTreeMap<FloatId, RenderedMarker>,
    rendered_generation: Option<Generation>,
    pending: Option<Vec<FloatRecord>>,
    next_z: u64,
    metrics: Metrics,
}

impl FloatLayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn rendered_len(&self) -> usize {
        self.rendered.len()
    }

    pub fn rendered_ids(&self) -> impl Iterator<Item = &FloatId> + '_ {
        self.rendered.keys()
    }

    pub fn record(&self, id: &FloatId) -> Option<&FloatRecord> {
        self.rendered.get(id).map(|m| &m.record)
    }

    pub fn z_order(&self, id: &FloatId) -> Option<u64> {
        self.rendered.get(id).map(|m| m.z_order)
    }

    /// Replace the visible set.
    pub fn set_visible<L: RendererLoader>(
        &mut self,
        next: Vec<FloatRecord>,
        viewport: &MapViewport<L>,
    ) -> LayerUpdate {
        if self.pending.replace(next).is_some() {
            debug!("stale reconcile discarded: superseded by newer filter result");
            self.metrics.inc_counter(names::RECONCILES_DISCARDED, 1);
        }
        match self.flush(viewport) {
            Some(diff) => LayerUpdate::Flushed(diff),
            None => LayerUpdate::Queued,
        }
    }

    /// Flush whatever is pending once the viewport became ready.
    pub fn on_viewport_ready<L: RendererLoader>(
        &mut self,
        viewport: &MapViewport<L>,
    ) -> Option<LayerDiff> {
        self.flush(viewport)
    }

    fn flush<L: RendererLoader>(&mut self, viewport: &MapViewport<L>) -> Option<LayerDiff> {
        if !viewport.is_ready() {
            return None;
        }

        let generation = viewport.generation();
        if self.rendered_generation != Some(generation) {
            let stale = std::mem::take(&mut self.rendered);
            self.rendered_generation = Some(generation);
            if self.pending.is_none() && !stale.is_empty() {
                debug!(
                    generation = generation.value(),
                    markers = stale.len(),
                    "renderer remounted; re-adding markers"
                );
                self.pending = Some(stale.into_values().map(|m| m.record).collect());
            }
        }

        let next = self.pending.take()?;
        let diff = reconcile(self.rendered.values().map(|m| &m.record), &next);

        let mut ops: Vec<MarkerOp> = diff.removed.iter().cloned().map(MarkerOp::Remove).collect();
        let mut added = Vec::with_capacity(diff.added.len());
        for record in &diff.added {
            let z_order = self.next_z;
            self.next_z += 1;
            ops.push(MarkerOp::Add(Marker {
                id: record.id.clone(),
                position: record.position,
                style: style_for(record.qc_flag),
                z_order,
            }));
            added.push(RenderedMarker {
                record: record.clone(),
                z_order,
            });
        }

        if let Err(e) = viewport.apply_marker_ops(&ops) {
            debug!("marker flush deferred: {e}");
            self.pending = Some(next);
            return None;
        }

        for id in &diff.removed {
            self.rendered.remove(id);
        }
        for marker in added {
            self.rendered.insert(marker.record.id.clone(), marker);
        }

        self.metrics.inc_counter(names::RECONCILES_FLUSHED, 1);
        self.metrics
            .inc_counter(names::MARKERS_ADDED, diff.added.len() as u64);
        self.metrics
            .inc_counter(names::MARKERS_REMOVED, diff.removed.len() as u64);
        self.metrics
            .set_gauge(names::VISIBLE_FLOATS, self.rendered.len() as i64);
        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            unchanged = diff.unchanged,
            "float layer reconciled"
        );
        Some(diff)
    }

    /// Resolve a click on the marker layer.
    ///
    /// `hits` are the marker ids under the pointer. The topmost rendered one
    /// is forwarded to `broker` exactly once; ids not on the layer are ignored.
    pub fn handle_click<S: ProfileSink>(
        &mut self,
        point: LatLon,
        hits: &[FloatId],
        broker: &mut SelectionBroker<S>,
    ) -> Option<FloatId> {
        let candidates: Vec<MarkerHit> = hits
            .iter()
            .filter_map(|id| {
                let marker = self.rendered.get(id)?;
                Some(MarkerHit {
                    id: id.clone(),
                    z_order: marker.z_order,
                    distance_m: haversine_m(point, marker.record.position),
                })
            })
            .collect();

        let picked = topmost(&candidates)?;
        let record = self.rendered.get(&picked.id)?.record.clone();
        broker.select(record);
        self.metrics.inc_counter(names::SELECTIONS, 1);
        Some(picked.id.clone())
    }

    /// Hit-test through the viewport, then [`FloatLayerManager::handle_click`].
    pub fn click_at<L: RendererLoader, S: ProfileSink>(
        &mut self,
        point: LatLon,
        tolerance_m: f64,
        viewport: &MapViewport<L>,
        broker: &mut SelectionBroker<S>,
    ) -> Option<FloatId> {
        let hits = match viewport.pick_markers(point, tolerance_m) {
            Ok(hits) => hits,
            Err(e) => {
                debug!("click ignored: {e}");
                return None;
            }
        };
        self.handle_click(point, &hits, broker)
    }

    /// Popup summary for a rendered marker.
    pub fn popup_text(&self, id: &FloatId) -> Option<String> {
        self.record(id).map(FloatRecord::summary)
    }
}
