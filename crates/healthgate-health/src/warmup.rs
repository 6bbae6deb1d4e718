//! Cache warm-up: populates the well-known cache entry at startup.
//!
//! The entry is written first, then the task waits out a simulated warm-up
//! delay. The wait holds no lock and ends early when the supplied
//! cancellation token fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use healthgate_core::{ConfigError, GateConfig};
use healthgate_state::CacheManager;

#[derive(Debug, Error)]
pub enum WarmUpError {
    /// The wait was interrupted; the token stays cancelled for the caller.
    #[error("cache warm-up cancelled before completion")]
    Cancelled,

    #[error("cache warm-up already ran")]
    AlreadyRun,
}

/// One-shot startup task writing a single cache entry.
#[derive(Debug)]
pub struct CacheWarmUp {
    caches: CacheManager,
    cache_name: String,
    key: String,
    value: String,
    delay: Duration,
    started: AtomicBool,
}

impl CacheWarmUp {
    pub fn new(
        caches: CacheManager,
        cache_name: &str,
        key: &str,
        value: &str,
        delay: Duration,
    ) -> Self {
        Self {
            caches,
            cache_name: cache_name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            delay,
            started: AtomicBool::new(false),
        }
    }

    pub fn from_config(caches: CacheManager, config: &GateConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            caches,
            &config.cache.name,
            &config.cache.key,
            &config.cache.value,
            config.warmup.delay()?,
        ))
    }

    /// Write the entry, then wait out the warm-up delay.
    ///
    /// Runs at most once per task. Returns [`WarmUpError::Cancelled`] as
    /// soon as `cancel` fires; the entry is written by then regardless.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), WarmUpError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(WarmUpError::AlreadyRun);
        }

        info!(cache = %self.cache_name, "cache warm-up initiated");
        let cache = self.caches.cache(&self.cache_name);
        cache.put(&self.key, &self.value);
        info!(
            cache = %self.cache_name,
            key = %self.key,
            entries = cache.len(),
            "cache populated"
        );

        debug!(delay = ?self.delay, "simulating cache warm-up delay");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(cache = %self.cache_name, "cache warm-up interrupted");
                Err(WarmUpError::Cancelled)
            }
            _ = tokio::time::sleep(self.delay) => {
                info!(cache = %self.cache_name, "cache warm-up completed");
                Ok(())
            }
        }
    }
}
