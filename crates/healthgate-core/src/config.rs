//! healthgate.toml configuration parser.
//!
//! Every section and field is optional; missing values fall back to the
//! behaviour of the dependency-checking deployment. Durations are kept as
//! strings in the file and resolved through [`parse_duration`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::parse_duration;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("random.seed must fit a TOML integer (at most {max}), got {0}", max = i64::MAX)]
    SeedOutOfRange(u64),

    #[error("unknown preset: {0:?}")]
    UnknownPreset(String),
}

/// Root of `healthgate.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub liveness: LivenessConfig,
    pub readiness: ReadinessConfig,
    pub cache: CacheConfig,
    pub warmup: WarmUpConfig,
    pub random: RandomConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding the record store.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("/var/lib/healthgate"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// How the liveness prober decides whether the process is alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivenessMode {
    /// Wait `delay`, then report alive.
    #[default]
    FixedDelay,
    /// Report broken with `failure_probability`.
    RandomFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub mode: LivenessMode,
    pub delay: String,
    pub failure_probability: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            mode: LivenessMode::FixedDelay,
            delay: "3s".to_string(),
            failure_probability: 0.1,
        }
    }
}

impl LivenessConfig {
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.delay)
    }
}

/// How the readiness prober decides whether to accept traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessMode {
    /// No dependency checks: wait `delay`, then accept traffic.
    Simulated,
    /// Failure injection followed by the configured `checks`.
    #[default]
    DependencyChecking,
}

/// A downstream dependency the readiness prober can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Storage,
    Cache,
    External,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Storage => f.write_str("storage"),
            CheckKind::Cache => f.write_str("cache"),
            CheckKind::External => f.write_str("external"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub mode: ReadinessMode,
    /// Placeholder delay used when no dependency check is configured.
    pub delay: String,
    /// Probability of an injected failure; 0 disables injection.
    pub failure_probability: f64,
    /// Checks run in order; the first failure short-circuits.
    pub checks: Vec<CheckKind>,
    pub external_url: String,
    pub external_timeout: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: ReadinessMode::DependencyChecking,
            delay: "3s".to_string(),
            failure_probability: 0.2,
            checks: vec![CheckKind::Storage, CheckKind::Cache, CheckKind::External],
            external_url: "https://api.github.com".to_string(),
            external_timeout: "5s".to_string(),
        }
    }
}

impl ReadinessConfig {
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.delay)
    }

    pub fn external_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.external_timeout)
    }

    /// Checks that actually run for the configured mode.
    pub fn active_checks(&self) -> &[CheckKind] {
        match self.mode {
            ReadinessMode::Simulated => &[],
            ReadinessMode::DependencyChecking => &self.checks,
        }
    }
}

/// The well-known cache entry written by the warm-up task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub name: String,
    pub key: String,
    pub value: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "testCache".to_string(),
            key: "testKey".to_string(),
            value: "testValue".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmUpConfig {
    pub delay: String,
}

impl Default for WarmUpConfig {
    fn default() -> Self {
        Self {
            delay: "3m".to_string(),
        }
    }
}

impl WarmUpConfig {
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.delay)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Fixed seed for the probe randomness sources; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Named bundles of probe modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Placeholder probes: fixed-delay liveness, delay-only readiness.
    Simulated,
    /// Random-failure liveness, readiness backed by every dependency check.
    DependencyChecking,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Preset::Simulated),
            "dependency-checking" => Ok(Preset::DependencyChecking),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

impl GateConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GateConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the configuration for a preset, keeping defaults elsewhere.
    pub fn preset(preset: Preset) -> Self {
        let mut config = GateConfig::default();
        config.apply_preset(preset);
        config
    }

    /// Switch the probe modes to those of `preset`.
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Simulated => {
                self.liveness.mode = LivenessMode::FixedDelay;
                self.readiness.mode = ReadinessMode::Simulated;
            }
            Preset::DependencyChecking => {
                self.liveness.mode = LivenessMode::RandomFailure;
                self.readiness.mode = ReadinessMode::DependencyChecking;
            }
        }
    }

    /// Reject values the probers cannot act on or the file cannot hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("liveness.failure_probability", self.liveness.failure_probability)?;
        check_probability("readiness.failure_probability", self.readiness.failure_probability)?;
        self.liveness.delay()?;
        self.readiness.delay()?;
        self.readiness.external_timeout()?;
        self.warmup.delay()?;
        match self.random.seed {
            Some(seed) if i64::try_from(seed).is_err() => Err(ConfigError::SeedOutOfRange(seed)),
            _ => Ok(()),
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}
