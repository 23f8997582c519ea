//! The two timing models and their parameters.
//!
//! Kept as separate functions so callers can see which one binds.

use serde::{Deserialize, Serialize};
use waveplan_core::{ConfigError, ConfigResult, ProjectConfig};

/// Share of nominal bandwidth usable after protocol and network overhead.
pub const NETWORK_EFFICIENCY: f64 = 0.75;
/// Extra transfer time for live resync of changed blocks.
pub const RESYNC_OVERHEAD: f64 = 1.14;
/// Cutover effort per tenant, in hours of one agent slot.
pub const CUTOVER_HOURS_PER_TENANT: f64 = 0.25;
/// Average wall-clock hours one agent slot spends per VM.
pub const AVG_HOURS_PER_VM: f64 = 2.0;

/// Which model produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingModel {
    Bandwidth,
    Schedule,
}

impl TimingModel {
    pub fn label(&self) -> &'static str {
        match self {
            TimingModel::Bandwidth => "bandwidth",
            TimingModel::Schedule => "schedule",
        }
    }
}

/// Global transfer parameters shared by every cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingParams {
    pub bandwidth_mbps: f64,
    pub agent_slots: u32,
    pub working_hours_per_day: f64,
    pub effective_vms_per_day: f64,
    /// Project deadline in days, if any.
    pub deadline_days: Option<f64>,
}

impl TimingParams {
    /// VMs/day achievable by the agent fleet.
    pub fn derived_vms_per_day(agent_count: u32, concurrent_vms: u32, working_hours: f64) -> f64 {
        let slots = f64::from(agent_count) * f64::from(concurrent_vms);
        non_negative(slots * working_hours / AVG_HOURS_PER_VM)
    }

    /// Parameters from project config; `target_vms_per_day` overrides the
    /// derived throughput.
    pub fn from_project(project: &ProjectConfig) -> Self {
        let effective_vms_per_day = project.target_vms_per_day.unwrap_or_else(|| {
            Self::derived_vms_per_day(
                project.agent_count,
                project.agent_concurrent_vms,
                project.working_hours_per_day,
            )
        });
        Self {
            bandwidth_mbps: project.bandwidth_mbps,
            agent_slots: project.agent_count,
            working_hours_per_day: project.working_hours_per_day,
            effective_vms_per_day,
            deadline_days: project.migration_duration_days,
        }
    }

    /// Rejects parameters that would make the estimate meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("bandwidth_mbps", self.bandwidth_mbps),
            ("working_hours_per_day", self.working_hours_per_day),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTiming { field, value });
            }
        }
        if !self.effective_vms_per_day.is_finite() || self.effective_vms_per_day < 0.0 {
            return Err(ConfigError::InvalidTiming {
                field: "effective_vms_per_day",
                value: self.effective_vms_per_day,
            });
        }
        if let Some(d) = self.deadline_days
            && (!d.is_finite() || d < 0.0)
        {
            return Err(ConfigError::InvalidTiming {
                field: "deadline_days",
                value: d,
            });
        }
        Ok(())
    }
}

/// Division that yields 0 instead of NaN or infinity.
pub(crate) fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() && numerator.is_finite() {
        non_negative(numerator / denominator)
    } else {
        0.0
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Bandwidth-bound breakdown for one cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandwidthEstimate {
    pub transfer_hours: f64,
    pub cutover_hours: f64,
    pub total_hours: f64,
    pub bandwidth_days: f64,
}

/// Transfer plus cutover time for `disk_gb` of data across `tenant_count`
/// tenants.
pub fn bandwidth_estimate(disk_gb: f64, tenant_count: usize, params: &TimingParams) -> BandwidthEstimate {
    let effective_mbps = non_negative(params.bandwidth_mbps) * NETWORK_EFFICIENCY;
    let megabits = non_negative(disk_gb) * 8.0 * 1024.0;
    let raw_transfer_hours = safe_div(megabits, effective_mbps * 3600.0);
    let transfer_hours = raw_transfer_hours * RESYNC_OVERHEAD;

    let slots = f64::from(params.agent_slots.max(1));
    let cutover_hours = tenant_count as f64 * CUTOVER_HOURS_PER_TENANT / slots;

    let total_hours = transfer_hours + cutover_hours;
    BandwidthEstimate {
        transfer_hours,
        cutover_hours,
        total_hours,
        bandwidth_days: safe_div(total_hours, params.working_hours_per_day),
    }
}

/// Days to push `vm_count` VMs through the agent fleet.
pub fn schedule_days(vm_count: u64, params: &TimingParams) -> f64 {
    safe_div(vm_count as f64, params.effective_vms_per_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TimingParams {
        TimingParams {
            bandwidth_mbps: 1000.0,
            agent_slots: 2,
            working_hours_per_day: 8.0,
            effective_vms_per_day: 40.0,
            deadline_days: None,
        }
    }

    #[test]
    fn one_terabyte_ten_tenants() {
        let est = bandwidth_estimate(1024.0, 10, &params());
        let raw: f64 = 1024.0 * 8.0 * 1024.0 / (750.0 * 3600.0);
        assert!((raw - 3.1069).abs() < 1e-3);
        assert!((est.transfer_hours - raw * 1.14).abs() < 1e-9);
        assert!((est.transfer_hours - 3.54).abs() < 0.01);
        assert_eq!(est.cutover_hours, 1.25);
        assert!((est.total_hours - 4.79).abs() < 0.01);
        assert!((est.bandwidth_days - 0.60).abs() < 0.01);
    }

    #[test]
    fn zero_bandwidth_and_hours_yield_zero() {
        let p = TimingParams {
            bandwidth_mbps: 0.0,
            working_hours_per_day: 0.0,
            ..params()
        };
        let est = bandwidth_estimate(500.0, 3, &p);
        assert_eq!(est.transfer_hours, 0.0);
        assert_eq!(est.bandwidth_days, 0.0);
        assert!(est.total_hours.is_finite());
    }

    #[test]
    fn zero_agent_slots_treated_as_one() {
        let p = TimingParams {
            agent_slots: 0,
            ..params()
        };
        assert_eq!(bandwidth_estimate(0.0, 4, &p).cutover_hours, 1.0);
    }

    #[test]
    fn schedule_days_guards_zero_throughput() {
        assert_eq!(schedule_days(80, &params()), 2.0);
        assert_eq!(schedule_days(0, &params()), 0.0);
        let p = TimingParams {
            effective_vms_per_day: 0.0,
            ..params()
        };
        assert_eq!(schedule_days(80, &p), 0.0);
    }

    #[test]
    fn derived_throughput() {
        // 2 agents * 5 concurrent * 8 hours / 2.0 hours per VM
        assert_eq!(TimingParams::derived_vms_per_day(2, 5, 8.0), 40.0);
        assert_eq!(TimingParams::derived_vms_per_day(0, 5, 8.0), 0.0);
    }

    #[test]
    fn from_project_prefers_override() {
        let mut project = ProjectConfig {
            name: "p".to_string(),
            working_hours_per_day: 10.0,
            migration_duration_days: Some(30.0),
            agent_count: 3,
            agent_concurrent_vms: 4,
            target_vms_per_day: None,
            bandwidth_mbps: 2000.0,
        };
        let p = TimingParams::from_project(&project);
        assert_eq!(p.effective_vms_per_day, 60.0);
        assert_eq!(p.agent_slots, 3);
        assert_eq!(p.deadline_days, Some(30.0));

        project.target_vms_per_day = Some(25.0);
        assert_eq!(TimingParams::from_project(&project).effective_vms_per_day, 25.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(params().validate().is_ok());
        let p = TimingParams {
            working_hours_per_day: 0.0,
            ..params()
        };
        assert!(matches!(
            p.validate(),
            Err(ConfigError::InvalidTiming { field: "working_hours_per_day", .. })
        ));
        let p = TimingParams {
            deadline_days: Some(f64::INFINITY),
            ..params()
        };
        assert!(p.validate().is_err());
    }
}
