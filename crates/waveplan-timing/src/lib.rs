//! waveplan timing: how many days will the migration take?
//!
//! Estimates each cohort, and the plan as a whole, under two independent
//! models. Cohorts run back to back, so plan totals are plain sums.
//!
//! # Models
//!
//! ```text
//! bandwidth-bound:
//!     effective_mbps = bandwidth_mbps * 0.75
//!     transfer_hours = disk_gb * 8 * 1024 / (effective_mbps * 3600) * 1.14
//!     cutover_hours  = tenants * 0.25 / max(agent_slots, 1)
//!     bandwidth_days = (transfer_hours + cutover_hours) / working_hours_per_day
//!
//! schedule-bound:
//!     effective_vms_per_day = target_vms_per_day
//!                          or agents * concurrent_vms * working_hours / 2.0
//!     schedule_days         = vm_count / effective_vms_per_day
//! ```
//!
//! Any division by zero yields zero. The binding model is whichever total
//! is larger; each is checked against the deadline on its own.

pub mod estimate;
pub mod model;

pub use estimate::{CohortTiming, PlanEstimate, PlanTotals, WhatIf, estimate, what_if};
pub use model::{BandwidthEstimate, TimingModel, TimingParams, bandwidth_estimate, schedule_days};
