//! waveplan-core: shared types for migration capacity planning.
//!
//! Holds the inventory records read from the backend, the policy records
//! planners edit (ease weights, guardrails, cohort layouts, strategies),
//! and the `waveplan.toml` parser. The algorithm crates depend on this
//! one and never on each other's internals.

pub mod config;
pub mod error;
pub mod policy;
pub mod types;

pub use config::{CohortConfig, PlanConfig, ProjectConfig, WaveConfig};
pub use error::{ConfigError, ConfigResult};
pub use policy::*;
pub use types::*;
