use dataset::FloatId;
use foundation::math::precision::stable_total_cmp_f64;

/// One marker under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHit {
    pub id: FloatId,
    pub z_order: u64,
    /// Ground distance from the click point.
    pub distance_m: f64,
}

/// Topmost marker among `hits`.
///
/// Ordering contract:
/// - The highest `z_order` (most recently added) wins.
/// - Equal `z_order`: the closer hit wins, then the lower id.
pub fn topmost(hits: &[MarkerHit]) -> Option<&MarkerHit> {
    hits.iter().min_by(|a, b| {
        b.z_order
            .cmp(&a.z_order)
            .then_with(|| stable_total_cmp_f64(a.distance_m, b.distance_m))
            .then_with(|| a.id.cmp(&b.id))
    })
}

#[cfg(test)]
mod tests {
    use super::{MarkerHit, topmost};
    use dataset::FloatId;

    fn hit(id: &str, z_order: u64, distance_m: f64) -> MarkerHit {
        MarkerHit {
            id: FloatId::new(id),
            z_order,
            distance_m,
        }
    }

    #[test]
    fn highest_z_order_wins_regardless_of_distance() {
        let hits = vec![hit("argo_1", 3, 10.0), hit("argo_2", 7, 900.0)];
        assert_eq!(topmost(&hits).unwrap().id, FloatId::new("argo_2"));
    }

    #[test]
    fn ties_break_on_distance_then_id() {
        let hits = vec![hit("argo_9", 2, 50.0), hit("argo_3", 2, 50.0), hit("argo_1", 2, 80.0)];
        assert_eq!(topmost(&hits).unwrap().id, FloatId::new("argo_3"));
    }

    #[test]
    fn no_hits_no_pick() {
        assert!(topmost(&[]).is_none());
    }
}
