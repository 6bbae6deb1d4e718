//! healthgate-core: configuration shared by every healthgate crate.
//!
//! The daemon reads a `healthgate.toml` into [`GateConfig`]; the probe
//! registry and the warm-up task resolve their delays, probabilities and
//! dependency checks from it.

pub mod config;
pub mod duration;

pub use config::*;
pub use duration::parse_duration;
