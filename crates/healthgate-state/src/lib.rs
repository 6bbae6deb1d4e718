//! healthgate-state: the collaborators the readiness probe depends on.
//!
//! - [`StateStore`]: a [redb](https://docs.rs/redb) journal of daemon
//!   starts, the storage dependency. The daemon appends a record on every
//!   start and the storage check reads the table back in full.
//! - [`CacheManager`]: named in-memory caches of string entries, written
//!   by the warm-up task and read by the cache dependency check.
//!
//! Both are `Clone` + `Send` + `Sync` and can be shared across async tasks.

pub mod cache;
pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use cache::{Cache, CacheManager};
pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
