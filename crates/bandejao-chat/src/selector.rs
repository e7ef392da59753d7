//! Choosing one answer among several template candidates.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index into a list of candidate responses.
pub trait ResponseSelector: Send + Sync {
    /// Return an index in `0..len`. Only called with `len >= 2`.
    fn select(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl ResponseSelector for RandomSelector {
    fn select(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Uniform choice from a seeded RNG, reproducible across runs.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ResponseSelector for SeededSelector {
    fn select(&self, len: usize) -> usize {
        // A panic while holding the lock cannot leave the RNG invalid.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(0..len)
    }
}

/// Seeded when `seed` is set, random otherwise.
pub fn selector_for(seed: Option<u64>) -> Box<dyn ResponseSelector> {
    match seed {
        Some(seed) => Box::new(SeededSelector::new(seed)),
        None => Box::new(RandomSelector),
    }
}
