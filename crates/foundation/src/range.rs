use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` range.
///
/// Construction through [`InclusiveRange::new`] re-orders swapped bounds, so a
/// range built that way is never inverted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InclusiveRange<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd + Copy> InclusiveRange<T> {
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn single(v: T) -> Self {
        Self { start: v, end: v }
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Same range with bounds swapped back into order if needed.
    pub fn sorted(self) -> Self {
        Self::new(self.start, self.end)
    }

    pub fn contains(&self, v: T) -> bool {
        v >= self.start && v <= self.end
    }

    /// Clamp both bounds into `[lo, hi]`.
    pub fn clamped(self, lo: T, hi: T) -> Self {
        let clamp = |v: T| {
            if v < lo {
                lo
            } else if v > hi {
                hi
            } else {
                v
            }
        };
        Self::new(clamp(self.start), clamp(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::InclusiveRange;

    #[test]
    fn new_reorders_swapped_bounds() {
        let r = InclusiveRange::new(1900u32, 100);
        assert_eq!(r, InclusiveRange { start: 100, end: 1900 });
        assert!(!r.is_inverted());
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let r = InclusiveRange::new(0u32, 2000);
        assert!(r.contains(0));
        assert!(r.contains(2000));
        assert!(!r.contains(2001));
    }

    #[test]
    fn single_value_range_matches_exactly() {
        let r = InclusiveRange::single(500u32);
        assert!(r.contains(500));
        assert!(!r.contains(499));
        assert!(!r.contains(501));
    }

    #[test]
    fn clamped_keeps_bounds_within_limits() {
        let r = InclusiveRange { start: 2500u32, end: 10 }.clamped(0, 2000);
        assert_eq!(r, InclusiveRange { start: 10, end: 2000 });
    }
}
