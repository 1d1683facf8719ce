use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Source of the uniform samples behind spawn delays, channel picks and draws
pub trait RandomSource: Send {
    /// Uniform sample in `[0, 1)`
    fn unit(&mut self) -> f64;

    /// Uniform index in `[0, len)`, `len` must be non-zero
    fn index(&mut self, len: usize) -> usize;

    /// Uniform integer in `[low, high]`
    fn between(&mut self, low: u64, high: u64) -> u64;
}

impl<R: Rng + Send> RandomSource for R {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn between(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low..=high)
    }
}

/// Cloneable handle to one random source shared by every component
#[derive(Clone)]
pub struct SharedRandom {
    inner: Arc<Mutex<Box<dyn RandomSource>>>,
}

impl SharedRandom {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(source))),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// True with the given probability: a uniform sample compared `< probability`
    pub fn draw(&self, probability: f64) -> bool {
        self.inner.lock().unit() < probability
    }

    pub fn index(&self, len: usize) -> usize {
        self.inner.lock().index(len)
    }

    pub fn between(&self, low: u64, high: u64) -> u64 {
        self.inner.lock().between(low, high)
    }
}

impl std::fmt::Debug for SharedRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRandom").finish_non_exhaustive()
    }
}
