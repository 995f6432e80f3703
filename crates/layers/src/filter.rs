use std::collections::BTreeSet;

use chrono::NaiveDate;
use dataset::{FloatRecord, QcFlag, Variable};
use foundation::math::precision::stable_total_cmp_f64;
use foundation::{InclusiveRange, LatLon, SpatialBound, haversine_m};
use serde::{Deserialize, Serialize};

/// Default deepest profile depth the dashboard accepts.
pub const DEPTH_CEILING_M: u32 = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "flags", rename_all = "snake_case")]
pub enum QcPolicy {
    All,
    #[default]
    GoodOnly,
    Custom(BTreeSet<QcFlag>),
}

impl QcPolicy {
    pub fn admits(&self, flag: QcFlag) -> bool {
        match self {
            QcPolicy::All => true,
            QcPolicy::GoodOnly => flag == QcFlag::Good,
            QcPolicy::Custom(allowed) => allowed.contains(&flag),
        }
    }
}

/// User-selected filter state pushed by the sidebar.
///
/// Values coming from outside may be malformed; [`FilterCriteria::sanitized`]
/// turns any value into a well-formed one and [`apply_with_ceiling`] always
/// sanitizes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date_range: InclusiveRange<NaiveDate>,
    pub depth_range: InclusiveRange<u32>,
    pub qc_policy: QcPolicy,
    /// Export columns only; never used to filter rows.
    pub enabled_variables: BTreeSet<Variable>,
    pub spatial_bound: Option<SpatialBound>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
        Self {
            date_range: InclusiveRange::new(start, end),
            depth_range: InclusiveRange::new(0, DEPTH_CEILING_M),
            qc_policy: QcPolicy::GoodOnly,
            enabled_variables: [Variable::Temperature, Variable::Salinity, Variable::Pressure]
                .into_iter()
                .collect(),
            spatial_bound: None,
        }
    }
}

impl FilterCriteria {
    /// Swapped ranges are re-ordered and depth is clamped into
    /// `[0, ceiling_m]`.
    pub fn sanitized(&self, ceiling_m: u32) -> FilterCriteria {
        FilterCriteria {
            date_range: self.date_range.sorted(),
            depth_range: self.depth_range.clamped(0, ceiling_m),
            ..self.clone()
        }
    }

    pub fn is_well_formed(&self, ceiling_m: u32) -> bool {
        !self.date_range.is_inverted()
            && !self.depth_range.is_inverted()
            && self.depth_range.end <= ceiling_m
    }

    /// `true` if `record` passes every predicate.
    ///
    /// Evaluated cheapest first: qc, date, depth, spatial.
    pub fn admits(&self, record: &FloatRecord) -> bool {
        self.qc_policy.admits(record.qc_flag)
            && self.date_range.contains(record.profile_date)
            && self.depth_range.contains(record.depth_m)
            && self
                .spatial_bound
                .as_ref()
                .is_none_or(|bound| bound.contains(record.position))
    }
}

/// Visible subset of `records`, in input order, under the default
/// [`DEPTH_CEILING_M`].
pub fn apply(records: &[FloatRecord], criteria: &FilterCriteria) -> Vec<FloatRecord> {
    apply_with_ceiling(records, criteria, DEPTH_CEILING_M)
}

/// Visible subset of `records`, in input order, with depth clamped to
/// `ceiling_m`.
pub fn apply_with_ceiling(
    records: &[FloatRecord],
    criteria: &FilterCriteria,
    ceiling_m: u32,
) -> Vec<FloatRecord> {
    let criteria = criteria.sanitized(ceiling_m);
    if criteria.spatial_bound.as_ref().is_some_and(SpatialBound::is_degenerate) {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| criteria.admits(r))
        .cloned()
        .collect()
}

/// The `k` records closest to `point` by great-circle distance.
///
/// Ordering contract:
/// - Ascending distance; equal distances keep input order.
pub fn nearest(records: &[FloatRecord], point: LatLon, k: usize) -> Vec<(f64, FloatRecord)> {
    let mut by_distance: Vec<(f64, &FloatRecord)> = records
        .iter()
        .map(|r| (haversine_m(point, r.position), r))
        .collect();
    by_distance.sort_by(|a, b| stable_total_cmp_f64(a.0, b.0));
    by_distance
        .into_iter()
        .take(k)
        .map(|(d, r)| (d, r.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DEPTH_CEILING_M, FilterCriteria, QcPolicy, apply, apply_with_ceiling, nearest};
    use chrono::NaiveDate;
    use dataset::{FloatId, FloatRecord, GeneratorConfig, QcFlag, generate};
    use foundation::{GeoBox, GeoCircle, InclusiveRange, LatLon, SpatialBound};
    use pretty_assertions::assert_eq;

    fn record(id: &str, qc_flag: QcFlag, depth_m: u32, position: LatLon) -> FloatRecord {
        FloatRecord {
            id: FloatId::new(id),
            platform_id: "2900000".to_string(),
            cycle_number: 1,
            profile_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            qc_flag,
            temperature: 20.0,
            salinity: 35.0,
            depth_m,
            position,
        }
    }

    fn generated() -> Vec<FloatRecord> {
        generate(&GeneratorConfig::default()).unwrap().records().to_vec()
    }

    fn ids(records: &[FloatRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn good_only_with_depth_ceiling_keeps_only_shallow_good_record() {
        let p = LatLon::new(15.0, 65.0);
        let records = vec![
            record("a", QcFlag::Good, 100, p),
            record("b", QcFlag::Bad, 1900, p),
            record("c", QcFlag::Good, 2100, p),
        ];
        let criteria = FilterCriteria {
            depth_range: InclusiveRange::new(0, 2000),
            qc_policy: QcPolicy::GoodOnly,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&records, &criteria)), vec!["a"]);
    }

    #[test]
    fn good_only_never_admits_bad_records() {
        let criteria = FilterCriteria {
            qc_policy: QcPolicy::GoodOnly,
            date_range: InclusiveRange::new(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ),
            ..FilterCriteria::default()
        };
        let visible = apply(&generated(), &criteria);
        assert!(!visible.is_empty());
        assert!(visible.iter().all(|r| r.qc_flag == QcFlag::Good));
    }

    #[test]
    fn apply_is_idempotent() {
        let records = generated();
        for criteria in [
            FilterCriteria::default(),
            FilterCriteria {
                qc_policy: QcPolicy::All,
                depth_range: InclusiveRange::new(500, 1500),
                spatial_bound: Some(SpatialBound::Rectangle(GeoBox::new(10.0, 55.0, 25.0, 70.0))),
                ..FilterCriteria::default()
            },
        ] {
            let once = apply(&records, &criteria);
            assert_eq!(apply(&once, &criteria), once);
        }
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        assert!(apply(&[], &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn degenerate_bound_admits_nothing() {
        let p = LatLon::new(15.0, 65.0);
        let records = vec![record("a", QcFlag::Good, 100, p)];
        let criteria = FilterCriteria {
            spatial_bound: Some(SpatialBound::Rectangle(GeoBox::new(15.0, 60.0, 15.0, 70.0))),
            ..FilterCriteria::default()
        };
        assert!(apply(&records, &criteria).is_empty());

        let criteria = FilterCriteria {
            spatial_bound: Some(SpatialBound::Circle(GeoCircle::new(p, 0.0))),
            ..FilterCriteria::default()
        };
        assert!(apply(&records, &criteria).is_empty());
    }

    #[test]
    fn single_depth_matches_exactly() {
        let p = LatLon::new(15.0, 65.0);
        let records = vec![
            record("a", QcFlag::Good, 799, p),
            record("b", QcFlag::Good, 800, p),
            record("c", QcFlag::Good, 801, p),
        ];
        let criteria = FilterCriteria {
            depth_range: InclusiveRange::single(800),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&records, &criteria)), vec!["b"]);
    }

    #[test]
    fn malformed_criteria_are_clamped_not_rejected() {
        let criteria = FilterCriteria {
            depth_range: InclusiveRange { start: 5000, end: 100 },
            date_range: InclusiveRange {
                start: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            ..FilterCriteria::default()
        };
        assert!(!criteria.is_well_formed(DEPTH_CEILING_M));
        let fixed = criteria.sanitized(DEPTH_CEILING_M);
        assert!(fixed.is_well_formed(DEPTH_CEILING_M));
        assert_eq!(fixed.depth_range, InclusiveRange::new(100, DEPTH_CEILING_M));

        let p = LatLon::new(15.0, 65.0);
        let records = vec![record("a", QcFlag::Good, 1500, p)];
        assert_eq!(ids(&apply(&records, &criteria)), vec!["a"]);
    }

    #[test]
    fn lower_ceiling_clamps_default_depth_range() {
        let p = LatLon::new(15.0, 65.0);
        let records = vec![
            record("a", QcFlag::Good, 900, p),
            record("b", QcFlag::Good, 1000, p),
            record("c", QcFlag::Good, 1001, p),
        ];
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_well_formed(1000));
        assert_eq!(criteria.sanitized(1000).depth_range, InclusiveRange::new(0, 1000));
        assert_eq!(ids(&apply_with_ceiling(&records, &criteria, 1000)), vec!["a", "b"]);
        assert_eq!(ids(&apply(&records, &criteria)), vec!["a", "b", "c"]);
    }

    #[test]
    fn custom_policy_admits_listed_flags() {
        let p = LatLon::new(15.0, 65.0);
        let records = vec![record("a", QcFlag::Good, 100, p), record("b", QcFlag::Bad, 100, p)];
        let criteria = FilterCriteria {
            qc_policy: QcPolicy::Custom([QcFlag::Bad].into_iter().collect()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&records, &criteria)), vec!["b"]);

        let none = FilterCriteria {
            qc_policy: QcPolicy::Custom(Default::default()),
            ..FilterCriteria::default()
        };
        assert!(apply(&records, &none).is_empty());
    }

    #[test]
    fn circle_bound_filters_by_ground_distance() {
        let center = LatLon::new(10.0, 75.0);
        let records = vec![
            record("near", QcFlag::Good, 100, LatLon::new(10.5, 75.0)),
            record("far", QcFlag::Good, 100, LatLon::new(14.0, 75.0)),
        ];
        let criteria = FilterCriteria {
            spatial_bound: Some(SpatialBound::Circle(GeoCircle::new(center, 100_000.0))),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&apply(&records, &criteria)), vec!["near"]);
    }

    #[test]
    fn nearest_orders_by_distance() {
        let records = vec![
            record("far", QcFlag::Good, 100, LatLon::new(20.0, 75.0)),
            record("near", QcFlag::Good, 100, LatLon::new(10.1, 75.0)),
            record("mid", QcFlag::Bad, 100, LatLon::new(12.0, 75.0)),
        ];
        let got = nearest(&records, LatLon::new(10.0, 75.0), 2);
        let got_ids: Vec<&str> = got.iter().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(got_ids, vec!["near", "mid"]);
        assert!(got[0].0 < got[1].0);
    }

    #[test]
    fn criteria_deserialize_with_defaults() {
        let json = r#"{"qc_policy": {"policy": "all"}, "depth_range": {"start": 0, "end": 500}}"#;
        let criteria: FilterCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(criteria.qc_policy, QcPolicy::All);
        assert_eq!(criteria.depth_range, InclusiveRange::new(0, 500));
        assert_eq!(criteria.date_range, FilterCriteria::default().date_range);
    }
}
