//! Float helpers for measurements and ordering.

use core::cmp::Ordering;

/// Round to a fixed number of decimal places, e.g. `0.1 °C` or `0.01 PSU`.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Total order over floats that treats `-0.0 == 0.0` and all NaNs as one
/// value (sorted last).
///
/// Use it for distances and other tie-broken sorts so results are the same
/// on every run.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // Both finite or infinite; `+ 0.0` folds -0.0 into 0.0.
        (false, false) => (a + 0.0).total_cmp(&(b + 0.0)),
    }
}
