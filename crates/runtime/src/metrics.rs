use std::collections::BTreeMap;

/// Metric names recorded by the float layer and selection path.
pub mod names {
    pub const MARKERS_ADDED: &str = "layer.markers_added";
    pub const MARKERS_REMOVED: &str = "layer.markers_removed";
    pub const RECONCILES_FLUSHED: &str = "layer.reconciles_flushed";
    /// Pending visible sets replaced before they reached the renderer.
    pub const RECONCILES_DISCARDED: &str = "layer.reconciles_discarded";
    pub const SELECTIONS: &str = "selection.forwarded";
    pub const VISIBLE_FLOATS: &str = "layer.visible_floats";
}

/// In-process counters and gauges for one session.
///
/// Ordering contract:
/// - [`Metrics::snapshot`] lists entries sorted by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero for counters never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map_or(0, |v| *v)
    }

    pub fn inc_counter(&mut self, name: &'static str, by: u64) {
        let slot = self.counters.entry(name).or_default();
        *slot = slot.saturating_add(by);
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.clone().into_iter().collect(),
            gauges: self.gauges.clone().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Metrics, names};

    #[test]
    fn marker_counters_accumulate_per_flush() {
        let mut m = Metrics::new();
        for added in [120, 0, 7] {
            m.inc_counter(names::MARKERS_ADDED, added);
            m.inc_counter(names::RECONCILES_FLUSHED, 1);
        }
        assert_eq!(m.counter(names::MARKERS_ADDED), 127);
        assert_eq!(m.counter(names::RECONCILES_FLUSHED), 3);
        assert_eq!(m.counter(names::MARKERS_REMOVED), 0);
    }

    #[test]
    fn visible_gauge_tracks_latest_value() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge(names::VISIBLE_FLOATS), None);
        m.set_gauge(names::VISIBLE_FLOATS, 171);
        m.set_gauge(names::VISIBLE_FLOATS, 42);
        assert_eq!(m.gauge(names::VISIBLE_FLOATS), Some(42));
    }

    #[test]
    fn snapshot_lists_names_in_order() {
        let mut m = Metrics::new();
        m.inc_counter(names::SELECTIONS, 2);
        m.inc_counter(names::RECONCILES_DISCARDED, 1);
        m.set_gauge(names::VISIBLE_FLOATS, 9);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![(names::RECONCILES_DISCARDED, 1), (names::SELECTIONS, 2)]
        );
        assert_eq!(snap.gauges, vec![(names::VISIBLE_FLOATS, 9)]);
    }
}
