//! Injectable random source
//!
//! Every random decision in the services draws from a [`SharedRng`]. Production
//! code seeds it from entropy; tests seed it with a fixed value.

use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to one seeded generator
#[derive(Debug, Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<StdRng>>,
}

impl SharedRng {
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            inner: Arc::new(Mutex::new(rng)),
        }
    }

    /// Run `f` with exclusive access to the generator.
    ///
    /// The lock is released when `f` returns, so never call this across an
    /// `.await`.
    pub fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// An independent generator seeded from this one, for loops that must
    /// hold a generator across `.await` points
    pub fn fork(&self) -> StdRng {
        self.with(|rng| StdRng::seed_from_u64(rng.next_u64()))
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
