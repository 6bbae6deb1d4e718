//! The probe contract and the randomness source probes draw from.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::availability::{AvailabilityState, Health};

/// Unexpected failures inside a probe evaluation.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("randomness source poisoned by a panicked holder")]
    RandomnessPoisoned,
}

/// A unit of logic answering a liveness or readiness question on demand.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    type State: AvailabilityState;

    fn name(&self) -> &str;

    /// Recompute the current state.
    async fn evaluate(&self) -> Result<Self::State, ProbeError>;

    /// Health report for the current state.
    async fn health(&self) -> Result<Health, ProbeError> {
        let state = self.evaluate().await?;
        Ok(Health::from_state(state))
    }
}

/// Seedable randomness shared by clones of the same source.
///
/// The generator sits behind a mutex held for a single draw, so concurrent
/// evaluations stay safe and a seeded source yields a reproducible sequence.
#[derive(Clone)]
pub struct Randomness {
    rng: Arc<Mutex<StdRng>>,
}

impl Randomness {
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// `true` with the given probability.
    pub fn chance(&self, probability: f64) -> Result<bool, ProbeError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ProbeError::InvalidProbability(probability));
        }
        let mut rng = self.rng.lock().map_err(|_| ProbeError::RandomnessPoisoned)?;
        Ok(rng.gen_bool(probability))
    }

    /// Poison the generator mutex by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let holder = self.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.rng.lock();
            panic!("poison the generator");
        })
        .join();
    }
}

impl fmt::Debug for Randomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Randomness").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_and_impossible_outcomes() {
        let randomness = Randomness::seeded(1);
        for _ in 0..100 {
            assert!(randomness.chance(1.0).unwrap());
            assert!(!randomness.chance(0.0).unwrap());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = Randomness::seeded(42);
        let b = Randomness::seeded(42);
        let draws_a: Vec<bool> = (0..64).map(|_| a.chance(0.5).unwrap()).collect();
        let draws_b: Vec<bool> = (0..64).map(|_| b.chance(0.5).unwrap()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn clones_share_one_sequence() {
        let original = Randomness::seeded(42);
        let clone = original.clone();
        let reference = Randomness::seeded(42);

        let interleaved: Vec<bool> = (0..32)
            .map(|i| {
                if i % 2 == 0 {
                    original.chance(0.5).unwrap()
                } else {
                    clone.chance(0.5).unwrap()
                }
            })
            .collect();
        let expected: Vec<bool> = (0..32).map(|_| reference.chance(0.5).unwrap()).collect();
        assert_eq!(interleaved, expected);
    }

    #[test]
    fn rejects_invalid_probability() {
        let randomness = Randomness::from_entropy();
        assert!(matches!(
            randomness.chance(1.5),
            Err(ProbeError::InvalidProbability(p)) if p == 1.5
        ));
        assert!(randomness.chance(-0.1).is_err());
        assert!(randomness.chance(f64::NAN).is_err());
    }

    #[test]
    fn poisoned_generator_is_an_error() {
        let randomness = Randomness::seeded(3);
        randomness.poison();

        assert!(matches!(
            randomness.chance(0.5),
            Err(ProbeError::RandomnessPoisoned)
        ));
    }
}
