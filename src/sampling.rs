//! Uniform random selection of traversal entry points
//!
//! A [`Sampler`] owns its random stream. Seeded samplers replay the same
//! sequence of picks, which the tests rely on; unseeded ones draw their seed
//! from the operating system.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("Cannot pick from an empty entry pool")]
    EmptyPool,
}

pub type SamplingResult<T> = Result<T, SamplingError>;

#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Reproducible sampler
    pub fn seeded(seed: u64) -> Self {
        Sampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Sampler {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Derive an independent sampler, e.g. one per worker thread
    ///
    /// Forks of a seeded sampler are themselves reproducible.
    pub fn fork(&mut self) -> Sampler {
        Sampler::seeded(self.rng.next_u64())
    }

    /// Index drawn uniformly from `0..len`
    pub fn pick_index(&mut self, len: usize) -> SamplingResult<usize> {
        if len == 0 {
            return Err(SamplingError::EmptyPool);
        }
        Ok(self.rng.gen_range(0..len))
    }

    /// Element drawn uniformly from `pool`
    pub fn pick<T: Copy>(&mut self, pool: &[T]) -> SamplingResult<T> {
        let index = self.pick_index(pool.len())?;
        Ok(pool[index])
    }

    /// Bernoulli trial with success probability `p`, clamped to [0, 1]
    ///
    /// A NaN probability never succeeds.
    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.rng.gen_bool(p)
        }
    }

    /// Float drawn uniformly from `[low, high)`
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }
}
