//! Liveness prober: should this process keep running?

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::availability::LivenessState;
use crate::probe::{HealthProbe, ProbeError, Randomness};

/// How liveness is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LivenessPolicy {
    /// Placeholder for a real self-check: wait `delay`, then report alive.
    FixedDelay { delay: Duration },
    /// Report broken with `failure_probability`, simulating transient faults.
    RandomFailure { failure_probability: f64 },
}

/// Evaluates liveness under a [`LivenessPolicy`].
///
/// Errors are returned to the caller rather than downgraded to
/// [`LivenessState::Broken`].
#[derive(Debug, Clone)]
pub struct LivenessProber {
    policy: LivenessPolicy,
    randomness: Randomness,
}

impl LivenessProber {
    pub fn new(policy: LivenessPolicy, randomness: Randomness) -> Self {
        Self { policy, randomness }
    }

    pub fn fixed_delay(delay: Duration) -> Self {
        Self::new(LivenessPolicy::FixedDelay { delay }, Randomness::from_entropy())
    }

    pub fn random_failure(failure_probability: f64, randomness: Randomness) -> Self {
        Self::new(
            LivenessPolicy::RandomFailure { failure_probability },
            randomness,
        )
    }

    pub fn policy(&self) -> LivenessPolicy {
        self.policy
    }

    async fn check_alive(&self) -> Result<bool, ProbeError> {
        match self.policy {
            LivenessPolicy::FixedDelay { delay } => {
                debug!(?delay, "simulating liveness check");
                tokio::time::sleep(delay).await;
                Ok(true)
            }
            LivenessPolicy::RandomFailure { failure_probability } => {
                let failed = self.randomness.chance(failure_probability)?;
                if failed {
                    warn!(failure_probability, "liveness check failed: simulated failure");
                }
                Ok(!failed)
            }
        }
    }
}

#[async_trait]
impl HealthProbe for LivenessProber {
    type State = LivenessState;

    fn name(&self) -> &str {
        "liveness"
    }

    async fn evaluate(&self) -> Result<LivenessState, ProbeError> {
        info!("liveness check initiated");
        let state = LivenessState::from_alive(self.check_alive().await?);
        debug!(?state, "liveness check finished");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Status;

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_is_always_correct_and_waits() {
        let delay = Duration::from_secs(3);
        let prober = LivenessProber::fixed_delay(delay);

        for _ in 0..3 {
            let start = tokio::time::Instant::now();
            assert_eq!(prober.evaluate().await.unwrap(), LivenessState::Correct);
            assert!(start.elapsed() >= delay);
        }
    }

    #[tokio::test]
    async fn random_failure_rate_tracks_probability() {
        let prober = LivenessProber::random_failure(0.1, Randomness::seeded(2024));
        let trials = 10_000;

        let mut broken = 0;
        for _ in 0..trials {
            if prober.evaluate().await.unwrap() == LivenessState::Broken {
                broken += 1;
            }
        }

        let rate = broken as f64 / trials as f64;
        assert!((rate - 0.1).abs() < 0.02, "observed broken rate {rate}");
    }

    #[tokio::test]
    async fn random_failure_is_reproducible_with_a_seed() {
        let a = LivenessProber::random_failure(0.5, Randomness::seeded(11));
        let b = LivenessProber::random_failure(0.5, Randomness::seeded(11));
        for _ in 0..50 {
            assert_eq!(a.evaluate().await.unwrap(), b.evaluate().await.unwrap());
        }
    }

    #[tokio::test]
    async fn certain_failure_reports_down() {
        let prober = LivenessProber::random_failure(1.0, Randomness::seeded(0));
        assert_eq!(prober.evaluate().await.unwrap(), LivenessState::Broken);
        assert_eq!(prober.health().await.unwrap().status, Status::Down);
    }

    #[tokio::test]
    async fn invalid_probability_propagates() {
        let prober = LivenessProber::random_failure(2.0, Randomness::seeded(0));
        assert!(matches!(
            prober.evaluate().await,
            Err(ProbeError::InvalidProbability(_))
        ));
        assert!(prober.health().await.is_err());
    }

    #[tokio::test]
    async fn poisoned_randomness_propagates() {
        let randomness = Randomness::seeded(0);
        randomness.poison();
        let prober = LivenessProber::random_failure(0.1, randomness);
        assert!(matches!(
            prober.evaluate().await,
            Err(ProbeError::RandomnessPoisoned)
        ));
    }

    #[test]
    fn exposes_policy_and_name() {
        let prober = LivenessProber::fixed_delay(Duration::from_millis(5));
        assert_eq!(
            prober.policy(),
            LivenessPolicy::FixedDelay { delay: Duration::from_millis(5) }
        );
        assert_eq!(prober.name(), "liveness");
    }
}
