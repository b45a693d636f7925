//! Randomness used when choosing reviewers.
//!
//! Injected into the engine so tests can supply a deterministic sequence and
//! assert exact outcomes.

use crate::types::ids::UserId;

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&self, len: usize) -> usize;

    /// Uniformly permute `ids` in place.
    fn shuffle(&self, ids: &mut [UserId]);
}

/// Process-wide generator backed by `fastrand`'s thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        fastrand::usize(..len)
    }

    fn shuffle(&self, ids: &mut [UserId]) {
        fastrand::shuffle(ids);
    }
}

impl<R: RandomSource + ?Sized> RandomSource for std::sync::Arc<R> {
    fn pick_index(&self, len: usize) -> usize {
        (**self).pick_index(len)
    }

    fn shuffle(&self, ids: &mut [UserId]) {
        (**self).shuffle(ids)
    }
}
