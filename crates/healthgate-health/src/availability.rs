//! Availability states and the health reports derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Externally visible status of a health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn is_up(self) -> bool {
        self == Status::Up
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => f.write_str("UP"),
            Status::Down => f.write_str("DOWN"),
        }
    }
}

/// A two-valued state a probe can report.
pub trait AvailabilityState: fmt::Debug + Copy + Send + Sync + 'static {
    fn status(&self) -> Status;
}

/// Whether the process should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LivenessState {
    /// The process may continue operating.
    Correct,
    /// The process is failed and should be restarted by its supervisor.
    Broken,
}

impl LivenessState {
    pub fn from_alive(alive: bool) -> Self {
        if alive {
            LivenessState::Correct
        } else {
            LivenessState::Broken
        }
    }
}

impl AvailabilityState for LivenessState {
    fn status(&self) -> Status {
        match self {
            LivenessState::Correct => Status::Up,
            LivenessState::Broken => Status::Down,
        }
    }
}

/// Whether the process should currently receive traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessState {
    AcceptingTraffic,
    /// Excluded from routing, but not restarted.
    RefusingTraffic,
}

impl ReadinessState {
    pub fn from_ready(ready: bool) -> Self {
        if ready {
            ReadinessState::AcceptingTraffic
        } else {
            ReadinessState::RefusingTraffic
        }
    }
}

impl AvailabilityState for ReadinessState {
    fn status(&self) -> Status {
        match self {
            ReadinessState::AcceptingTraffic => Status::Up,
            ReadinessState::RefusingTraffic => Status::Down,
        }
    }
}

/// Health report for a single probe: a status plus optional diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Health {
    pub fn up() -> Self {
        Self::with_status(Status::Up)
    }

    pub fn down() -> Self {
        Self::with_status(Status::Down)
    }

    pub fn with_status(status: Status) -> Self {
        Self {
            status,
            details: Map::new(),
        }
    }

    pub fn from_state<S: AvailabilityState>(state: S) -> Self {
        Self::with_status(state.status())
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Aggregate of several named reports; UP only when every component is UP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeHealth {
    pub status: Status,
    pub components: BTreeMap<String, Health>,
}

impl CompositeHealth {
    pub fn from_components(components: impl IntoIterator<Item = (String, Health)>) -> Self {
        let components: BTreeMap<String, Health> = components.into_iter().collect();
        let status = if components.values().all(|h| h.status.is_up()) {
            Status::Up
        } else {
            Status::Down
        };
        Self { status, components }
    }
}
