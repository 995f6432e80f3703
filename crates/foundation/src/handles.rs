/// Monotonic generation counter.
///
/// Work that captures a `Generation` when it starts is only allowed to apply
/// its result if the owner's generation is still the same when it finishes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    pub fn value(self) -> u64 {
        self.0
    }

    /// Advances to the next generation and returns it.
    pub fn bump(&mut self) -> Generation {
        self.0 += 1;
        *self
    }
}

/// Handle tagged with the generation it was issued in: `(sequence, generation)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64, Generation);

impl Handle {
    pub fn new(sequence: u64, generation: Generation) -> Self {
        Handle(sequence, generation)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    pub fn generation(&self) -> Generation {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::{Generation, Handle};

    #[test]
    fn bump_is_monotonic() {
        let mut g = Generation::ZERO;
        let a = g.bump();
        let b = g.bump();
        assert!(b > a);
        assert_eq!(g, b);
    }

    #[test]
    fn handles_compare_by_sequence_and_generation() {
        let mut g = Generation::ZERO;
        let g1 = g.bump();
        let g2 = g.bump();
        assert_ne!(Handle::new(1, g1), Handle::new(1, g2));
        assert_eq!(Handle::new(1, g1).generation(), g1);
    }
}
