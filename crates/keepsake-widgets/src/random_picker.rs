#![forbid(unsafe_code)]

//! Uniform random pick over a content list.
//!
//! Stateless apart from the random source: no memory of earlier picks, so
//! repeats are allowed. Seed the source for deterministic tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pick a uniformly random element. `None` for an empty slice.
pub fn pick<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// A picker that owns its random source.
#[derive(Debug, Clone)]
pub struct RandomPicker<R = StdRng> {
    rng: R,
}

impl RandomPicker<StdRng> {
    /// Deterministic picker.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Picker seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        pick(items, &mut self.rng)
    }
}

/// Availability of the "show me a reason" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickControl {
    Enabled,
    Disabled,
}

impl PickControl {
    /// Disabled while loading and for empty lists, so `pick` is never
    /// reached without items.
    #[must_use]
    pub fn for_items(loading: bool, len: usize) -> Self {
        if loading || len == 0 {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}
