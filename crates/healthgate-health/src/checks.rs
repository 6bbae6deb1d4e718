//! Dependency checks composed by the readiness prober.
//!
//! Each check verifies one downstream dependency and reports `Ok(())` when
//! it is usable. Checks never retry; the prober polls again on its own
//! schedule.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use thiserror::Error;
use tracing::debug;

use healthgate_state::{CacheManager, StateError, StateStore};

/// Why a dependency is considered unhealthy.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("storage query failed: {0}")]
    Storage(#[from] StateError),

    #[error("cache {cache:?} has no entry for {key:?}")]
    CacheMiss { cache: String, key: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },
}

/// A single downstream dependency verified before accepting traffic.
#[async_trait]
pub trait DependencyCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> Result<(), DependencyError>;
}

/// Healthy when the record table can be read in full.
#[derive(Clone)]
pub struct StorageCheck {
    store: StateStore,
}

impl StorageCheck {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DependencyCheck for StorageCheck {
    fn name(&self) -> &str {
        "storage"
    }

    async fn check(&self) -> Result<(), DependencyError> {
        let records = self.store.list_records()?;
        debug!(count = records.len(), "storage query succeeded");
        Ok(())
    }
}

/// Healthy when a known key is present in a named cache.
#[derive(Debug, Clone)]
pub struct CacheCheck {
    caches: CacheManager,
    cache_name: String,
    key: String,
}

impl CacheCheck {
    pub fn new(caches: CacheManager, cache_name: &str, key: &str) -> Self {
        Self {
            caches,
            cache_name: cache_name.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl DependencyCheck for CacheCheck {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> Result<(), DependencyError> {
        let present = self
            .caches
            .get_cache(&self.cache_name)
            .and_then(|cache| cache.get(&self.key))
            .is_some();

        if present {
            Ok(())
        } else {
            Err(DependencyError::CacheMiss {
                cache: self.cache_name.clone(),
                key: self.key.clone(),
            })
        }
    }
}

/// Healthy when a GET to a third-party URL yields a non-error response.
///
/// Redirects are followed; a final 4xx or 5xx, a transport failure or a
/// timeout counts as unhealthy.
#[derive(Debug, Clone)]
pub struct ExternalServiceCheck {
    client: reqwest::Client,
    url: String,
}

impl ExternalServiceCheck {
    /// Build a check with its own client bounded by `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DependencyCheck for ExternalServiceCheck {
    fn name(&self) -> &str {
        "external"
    }

    async fn check(&self) -> Result<(), DependencyError> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, concat!("healthgate/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|source| DependencyError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(DependencyError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        debug!(url = %self.url, %status, "external service answered");
        Ok(())
    }
}
