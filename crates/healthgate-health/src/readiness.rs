//! Readiness prober: should this process receive traffic right now?
//!
//! With dependency checks configured, an evaluation runs:
//!
//! 1. failure injection: refuse traffic with the configured probability;
//! 2. each check in order, refusing on the first failure;
//! 3. accept traffic once every check passed.
//!
//! With no checks configured, the prober waits a placeholder delay and
//! accepts traffic. Nothing in an evaluation can fail the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::availability::{Health, ReadinessState};
use crate::checks::DependencyCheck;
use crate::probe::{HealthProbe, ProbeError, Randomness};

/// Result of one readiness evaluation, with the diagnostic behind a refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessOutcome {
    pub state: ReadinessState,
    pub reason: Option<String>,
    /// Name of the dependency check that failed, if one did.
    pub failed_check: Option<String>,
}

impl ReadinessOutcome {
    fn accepting() -> Self {
        Self {
            state: ReadinessState::AcceptingTraffic,
            reason: None,
            failed_check: None,
        }
    }

    fn refusing(reason: String) -> Self {
        Self {
            state: ReadinessState::RefusingTraffic,
            reason: Some(reason),
            failed_check: None,
        }
    }

    fn refusing_check(check: &str, reason: String) -> Self {
        Self {
            failed_check: Some(check.to_string()),
            ..Self::refusing(reason)
        }
    }

    pub fn to_health(&self) -> Health {
        let mut health = Health::from_state(self.state);
        if let Some(reason) = &self.reason {
            health = health.with_detail("reason", reason.as_str());
        }
        if let Some(check) = &self.failed_check {
            health = health.with_detail("check", check.as_str());
        }
        health
    }
}

/// Composes failure injection and dependency checks into a readiness state.
pub struct ReadinessProber {
    failure_probability: f64,
    checks: Vec<Arc<dyn DependencyCheck>>,
    placeholder_delay: Duration,
    randomness: Randomness,
}

impl ReadinessProber {
    /// A prober with no checks, no failure injection and no placeholder delay.
    pub fn new(randomness: Randomness) -> Self {
        Self {
            failure_probability: 0.0,
            checks: Vec::new(),
            placeholder_delay: Duration::ZERO,
            randomness,
        }
    }

    /// Placeholder prober: wait `delay`, then accept traffic.
    pub fn simulated(delay: Duration) -> Self {
        Self::new(Randomness::from_entropy()).with_placeholder_delay(delay)
    }

    pub fn with_failure_injection(mut self, failure_probability: f64) -> Self {
        self.failure_probability = failure_probability;
        self
    }

    pub fn with_check(mut self, check: Arc<dyn DependencyCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_placeholder_delay(mut self, delay: Duration) -> Self {
        self.placeholder_delay = delay;
        self
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run one evaluation.
    pub async fn assess(&self) -> ReadinessOutcome {
        info!("readiness check initiated");

        if self.checks.is_empty() {
            debug!(
                delay = ?self.placeholder_delay,
                "no dependency checks, simulating readiness check"
            );
            tokio::time::sleep(self.placeholder_delay).await;
            info!("readiness check passed");
            return ReadinessOutcome::accepting();
        }

        match self.randomness.chance(self.failure_probability) {
            Ok(false) => {}
            Ok(true) => {
                warn!(
                    failure_probability = self.failure_probability,
                    "readiness check failed: injected failure"
                );
                return ReadinessOutcome::refusing("injected failure".to_string());
            }
            Err(e) => {
                error!(error = %e, "unexpected error during readiness check");
                return ReadinessOutcome::refusing(e.to_string());
            }
        }

        for check in &self.checks {
            info!(check = check.name(), "checking dependency");
            if let Err(e) = check.check().await {
                warn!(check = check.name(), error = %e, "readiness check failed");
                return ReadinessOutcome::refusing_check(check.name(), e.to_string());
            }
            info!(check = check.name(), "dependency check passed");
        }

        info!("readiness check passed");
        ReadinessOutcome::accepting()
    }
}

#[async_trait]
impl HealthProbe for ReadinessProber {
    type State = ReadinessState;

    fn name(&self) -> &str {
        "readiness"
    }

    async fn evaluate(&self) -> Result<ReadinessState, ProbeError> {
        Ok(self.assess().await.state)
    }

    async fn health(&self) -> Result<Health, ProbeError> {
        Ok(self.assess().await.to_health())
    }
}
