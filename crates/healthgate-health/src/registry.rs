//! Probe registry: the liveness and readiness probes a process exposes.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use healthgate_core::{CheckKind, ConfigError, GateConfig, LivenessMode};
use healthgate_state::{CacheManager, StateStore};

use crate::availability::{CompositeHealth, LivenessState, ReadinessState};
use crate::checks::{CacheCheck, DependencyCheck, ExternalServiceCheck, StorageCheck};
use crate::liveness::{LivenessPolicy, LivenessProber};
use crate::probe::{HealthProbe, ProbeError, Randomness};
use crate::readiness::ReadinessProber;

pub type LivenessProbe = Arc<dyn HealthProbe<State = LivenessState>>;
pub type ReadinessProbe = Arc<dyn HealthProbe<State = ReadinessState>>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// The registered probes, cheap to clone into request handlers.
#[derive(Clone)]
pub struct ProbeRegistry {
    liveness: LivenessProbe,
    readiness: ReadinessProbe,
}

impl ProbeRegistry {
    pub fn new(liveness: LivenessProbe, readiness: ReadinessProbe) -> Self {
        Self { liveness, readiness }
    }

    /// Build both probes for the modes selected in `config`.
    ///
    /// With `random.seed` set, liveness draws from `seed` and readiness from
    /// `seed + 1`, so the two sequences stay independent but reproducible.
    pub fn from_config(
        config: &GateConfig,
        store: StateStore,
        caches: CacheManager,
    ) -> Result<Self, RegistryError> {
        config.validate()?;

        let (liveness_rng, readiness_rng) = match config.random.seed {
            Some(seed) => (
                Randomness::seeded(seed),
                Randomness::seeded(seed.wrapping_add(1)),
            ),
            None => (Randomness::from_entropy(), Randomness::from_entropy()),
        };

        let policy = match config.liveness.mode {
            LivenessMode::FixedDelay => LivenessPolicy::FixedDelay {
                delay: config.liveness.delay()?,
            },
            LivenessMode::RandomFailure => LivenessPolicy::RandomFailure {
                failure_probability: config.liveness.failure_probability,
            },
        };
        let liveness = LivenessProber::new(policy, liveness_rng);

        let mut readiness = ReadinessProber::new(readiness_rng)
            .with_failure_injection(config.readiness.failure_probability)
            .with_placeholder_delay(config.readiness.delay()?);

        for kind in config.readiness.active_checks() {
            let check: Arc<dyn DependencyCheck> = match kind {
                CheckKind::Storage => Arc::new(StorageCheck::new(store.clone())),
                CheckKind::Cache => Arc::new(CacheCheck::new(
                    caches.clone(),
                    &config.cache.name,
                    &config.cache.key,
                )),
                CheckKind::External => Arc::new(ExternalServiceCheck::new(
                    &config.readiness.external_url,
                    config.readiness.external_timeout()?,
                )?),
            };
            readiness = readiness.with_check(check);
        }

        info!(
            liveness = ?config.liveness.mode,
            readiness = ?config.readiness.mode,
            checks = ?readiness.check_names(),
            "probes registered"
        );

        Ok(Self::new(Arc::new(liveness), Arc::new(readiness)))
    }

    pub fn liveness(&self) -> &LivenessProbe {
        &self.liveness
    }

    pub fn readiness(&self) -> &ReadinessProbe {
        &self.readiness
    }

    /// Both reports combined. A liveness error fails the whole report.
    pub async fn health(&self) -> Result<CompositeHealth, ProbeError> {
        let liveness = self.liveness.health().await?;
        let readiness = self.readiness.health().await?;
        Ok(CompositeHealth::from_components([
            (self.liveness.name().to_string(), liveness),
            (self.readiness.name().to_string(), readiness),
        ]))
    }
}
