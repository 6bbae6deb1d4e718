//! healthgate-health: liveness and readiness probing.
//!
//! Probes answer two questions for an external supervisor: should this
//! process keep running (liveness), and should it receive traffic right
//! now (readiness). Every evaluation is recomputed on demand; nothing is
//! cached between polls.
//!
//! # Architecture
//!
//! ```text
//! ProbeRegistry
//!   ├── LivenessProber  (HealthProbe<State = LivenessState>)
//!   │   └── fixed delay | random failure (Randomness)
//!   └── ReadinessProber (HealthProbe<State = ReadinessState>)
//!       ├── failure injection (Randomness)
//!       └── DependencyCheck* → storage, cache, external HTTP
//!
//! CacheWarmUp
//!   └── writes the well-known entry, then waits (cancellable)
//! ```
//!
//! # Failure semantics
//!
//! Liveness errors are returned to the caller so that they stay visible.
//! Readiness never fails: errors and failed checks become
//! `REFUSING_TRAFFIC`, with the reason attached to the health report.

pub mod availability;
pub mod checks;
pub mod liveness;
pub mod probe;
pub mod readiness;
pub mod registry;
pub mod warmup;

pub use availability::{
    AvailabilityState, CompositeHealth, Health, LivenessState, ReadinessState, Status,
};
pub use checks::{CacheCheck, DependencyCheck, DependencyError, ExternalServiceCheck, StorageCheck};
pub use liveness::{LivenessPolicy, LivenessProber};
pub use probe::{HealthProbe, ProbeError, Randomness};
pub use readiness::{ReadinessOutcome, ReadinessProber};
pub use registry::{LivenessProbe, ProbeRegistry, ReadinessProbe, RegistryError};
pub use warmup::{CacheWarmUp, WarmUpError};
