//! Configuration errors for waveplan policy records.

use thiserror::Error;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Problems detected while validating plan configuration, before any
/// packing or estimation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cohort layout has no cohorts")]
    EmptyLayout,

    #[error("cohort profile {index} ({name}) is unlimited but is not the last profile")]
    UnlimitedBeforeLast { index: usize, name: String },

    #[error("last cohort profile ({0}) must be unlimited to act as the overflow sink")]
    NoOverflowSink(String),

    #[error("invalid guardrail {field}: {value}")]
    InvalidGuardrail { field: &'static str, value: f64 },

    #[error("invalid ease weight {dimension}: {value}")]
    InvalidWeight { dimension: &'static str, value: f64 },

    #[error("invalid timing parameter {field}: {value}")]
    InvalidTiming { field: &'static str, value: f64 },

    #[error("unknown {kind} strategy: {name}")]
    UnknownStrategy { kind: &'static str, name: String },
}
