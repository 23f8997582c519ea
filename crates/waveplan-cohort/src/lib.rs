//! waveplan cohort packer: guardrail-constrained tenant bin-packing.
//!
//! Groups scored tenants into ordered cohorts under VM, disk, risk and OS
//! support guardrails. The last cohort is an overflow sink that accepts
//! anything; breaches there are reported as warnings, never errors. The
//! packer is pure: callers decide whether to persist the proposal.
//!
//! # Components
//!
//! - **`packer`**: Strategy ordering and placement (cursor fill, balanced fill)
//! - **`rollup`**: Per-cohort totals, effective caps, warning text
//! - **`error`**: Configuration errors raised before packing

pub mod error;
pub mod packer;
pub mod rollup;

pub use error::{PackError, PackResult};
pub use packer::{CohortPlan, pack};
pub use rollup::CohortAssignment;
