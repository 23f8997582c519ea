//! Packer error types.

use thiserror::Error;
use waveplan_core::ConfigError;

/// Errors that stop a pack before any tenant is placed.
///
/// Guardrail breaches are not errors; they surface as warnings on the plan.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("duplicate tenant id: {0}")]
    DuplicateTenant(String),
}

pub type PackResult<T> = Result<T, PackError>;
