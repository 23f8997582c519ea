//! Per-cohort and plan-level estimates.
//!
//! [`estimate`] runs both models over a cohort proposal. [`what_if`]
//! runs it twice, once per parameter set, and reports the day deltas.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use waveplan_cohort::CohortAssignment;

use crate::model::{TimingModel, TimingParams, bandwidth_estimate, schedule_days};

/// Both estimates for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortTiming {
    pub index: usize,
    pub name: String,
    pub tenant_count: usize,
    pub vm_count: u64,
    pub total_disk_gb: f64,
    pub transfer_hours: f64,
    pub cutover_hours: f64,
    pub total_hours: f64,
    pub bandwidth_days: f64,
    pub schedule_days: f64,
}

/// Sums over all cohorts. Cohorts run sequentially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTotals {
    pub transfer_hours: f64,
    pub cutover_hours: f64,
    pub total_hours: f64,
    pub bandwidth_days: f64,
    pub schedule_days: f64,
    pub bandwidth_exceeds_deadline: bool,
    pub schedule_exceeds_deadline: bool,
    /// The model with the larger day total. Bandwidth wins ties.
    pub binding_model: TimingModel,
}

impl PlanTotals {
    /// Day total of the binding model.
    pub fn binding_days(&self) -> f64 {
        match self.binding_model {
            TimingModel::Bandwidth => self.bandwidth_days,
            TimingModel::Schedule => self.schedule_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEstimate {
    pub per_cohort: Vec<CohortTiming>,
    pub totals: PlanTotals,
    pub deadline_days: Option<f64>,
}

/// Estimate every cohort under both models and sum the results.
pub fn estimate(cohorts: &[CohortAssignment], params: &TimingParams) -> PlanEstimate {
    let per_cohort: Vec<CohortTiming> = cohorts
        .iter()
        .map(|c| {
            let bw = bandwidth_estimate(c.total_disk_gb, c.tenant_count, params);
            let sched = schedule_days(c.vm_count, params);
            debug!(
                cohort = %c.name,
                disk_gb = c.total_disk_gb,
                vms = c.vm_count,
                bandwidth_days = bw.bandwidth_days,
                schedule_days = sched,
                "cohort estimate"
            );
            CohortTiming {
                index: c.index,
                name: c.name.clone(),
                tenant_count: c.tenant_count,
                vm_count: c.vm_count,
                total_disk_gb: c.total_disk_gb,
                transfer_hours: bw.transfer_hours,
                cutover_hours: bw.cutover_hours,
                total_hours: bw.total_hours,
                bandwidth_days: bw.bandwidth_days,
                schedule_days: sched,
            }
        })
        .collect();

    let totals = sum_totals(&per_cohort, params.deadline_days);

    info!(
        cohorts = per_cohort.len(),
        bandwidth_days = totals.bandwidth_days,
        schedule_days = totals.schedule_days,
        binding = totals.binding_model.label(),
        "plan estimate"
    );
    if totals.bandwidth_exceeds_deadline || totals.schedule_exceeds_deadline {
        warn!(
            deadline_days = params.deadline_days,
            bandwidth_days = totals.bandwidth_days,
            schedule_days = totals.schedule_days,
            "estimate exceeds project deadline"
        );
    }

    PlanEstimate {
        per_cohort,
        totals,
        deadline_days: params.deadline_days,
    }
}

fn sum_totals(per_cohort: &[CohortTiming], deadline_days: Option<f64>) -> PlanTotals {
    let transfer_hours = per_cohort.iter().map(|c| c.transfer_hours).sum();
    let cutover_hours = per_cohort.iter().map(|c| c.cutover_hours).sum();
    let total_hours = per_cohort.iter().map(|c| c.total_hours).sum();
    let bandwidth_days: f64 = per_cohort.iter().map(|c| c.bandwidth_days).sum();
    let schedule_days: f64 = per_cohort.iter().map(|c| c.schedule_days).sum();

    let exceeds = |days: f64| deadline_days.is_some_and(|d| days > d);
    let binding_model = if schedule_days > bandwidth_days {
        TimingModel::Schedule
    } else {
        TimingModel::Bandwidth
    };

    PlanTotals {
        transfer_hours,
        cutover_hours,
        total_hours,
        bandwidth_days,
        schedule_days,
        bandwidth_exceeds_deadline: exceeds(bandwidth_days),
        schedule_exceeds_deadline: exceeds(schedule_days),
        binding_model,
    }
}

/// Baseline vs scenario over the same cohorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIf {
    pub baseline: PlanEstimate,
    pub scenario: PlanEstimate,
    /// `scenario - baseline`; negative means faster.
    pub bandwidth_days_delta: f64,
    pub schedule_days_delta: f64,
}

pub fn what_if(cohorts: &[CohortAssignment], baseline: &TimingParams, scenario: &TimingParams) -> WhatIf {
    let baseline = estimate(cohorts, baseline);
    let scenario = estimate(cohorts, scenario);
    let bandwidth_days_delta = scenario.totals.bandwidth_days - baseline.totals.bandwidth_days;
    let schedule_days_delta = scenario.totals.schedule_days - baseline.totals.schedule_days;
    debug!(bandwidth_days_delta, schedule_days_delta, "what-if comparison");
    WhatIf {
        baseline,
        scenario,
        bandwidth_days_delta,
        schedule_days_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cohort(index: usize, tenants: usize, vms: u64, disk_gb: f64) -> CohortAssignment {
        CohortAssignment {
            index,
            name: format!("Cohort {}", index + 1),
            tenant_ids: (0..tenants).map(|i| format!("t{index}-{i}")).collect(),
            tenant_count: tenants,
            vm_count: vms,
            total_disk_gb: disk_gb,
            avg_risk_score: 0.0,
            avg_ease_score: 0.0,
            avg_os_support_pct: None,
            overflow_sink: false,
        }
    }

    fn make_params(deadline: Option<f64>) -> TimingParams {
        TimingParams {
            bandwidth_mbps: 1000.0,
            agent_slots: 2,
            working_hours_per_day: 8.0,
            effective_vms_per_day: 40.0,
            deadline_days: deadline,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn totals_are_sums_of_cohorts() {
        let cohorts = vec![
            make_cohort(0, 10, 40, 1024.0),
            make_cohort(1, 3, 90, 5000.0),
            make_cohort(2, 0, 0, 0.0),
        ];
        let est = estimate(&cohorts, &make_params(None));
        assert_eq!(est.per_cohort.len(), 3);

        let sum = |f: fn(&CohortTiming) -> f64| est.per_cohort.iter().map(f).sum::<f64>();
        assert!(close(est.totals.transfer_hours, sum(|c| c.transfer_hours)));
        assert!(close(est.totals.cutover_hours, sum(|c| c.cutover_hours)));
        assert!(close(est.totals.total_hours, sum(|c| c.total_hours)));
        assert!(close(est.totals.bandwidth_days, sum(|c| c.bandwidth_days)));
        assert!(close(est.totals.schedule_days, sum(|c| c.schedule_days)));

        for c in &est.per_cohort {
            assert!(close(c.total_hours, c.transfer_hours + c.cutover_hours));
            assert!(close(c.bandwidth_days, c.total_hours / 8.0));
        }
        assert_eq!(est.per_cohort[2].total_hours, 0.0);
    }

    #[test]
    fn one_terabyte_cohort_matches_reference_numbers() {
        let est = estimate(&[make_cohort(0, 10, 40, 1024.0)], &make_params(None));
        let c = &est.per_cohort[0];
        assert!((c.transfer_hours - 3.542).abs() < 0.01);
        assert_eq!(c.cutover_hours, 1.25);
        assert!((c.total_hours - 4.79).abs() < 0.01);
        assert!((c.bandwidth_days - 0.599).abs() < 0.01);
        assert_eq!(c.schedule_days, 1.0);
        assert_eq!(est.totals.binding_model, TimingModel::Schedule);
        assert_eq!(est.totals.binding_days(), 1.0);
    }

    #[test]
    fn deadline_checked_per_model() {
        // bandwidth ~0.6 days, schedule 1.0 days
        let cohorts = [make_cohort(0, 10, 40, 1024.0)];
        let est = estimate(&cohorts, &make_params(Some(0.8)));
        assert!(!est.totals.bandwidth_exceeds_deadline);
        assert!(est.totals.schedule_exceeds_deadline);
        assert_eq!(est.deadline_days, Some(0.8));

        let est = estimate(&cohorts, &make_params(None));
        assert!(!est.totals.bandwidth_exceeds_deadline);
        assert!(!est.totals.schedule_exceeds_deadline);

        // equal to the deadline is not over it
        let est = estimate(&cohorts, &make_params(Some(1.0)));
        assert!(!est.totals.schedule_exceeds_deadline);
    }

    #[test]
    fn bandwidth_binds_on_ties() {
        let est = estimate(&[], &make_params(None));
        assert_eq!(est.totals.bandwidth_days, 0.0);
        assert_eq!(est.totals.binding_model, TimingModel::Bandwidth);
    }

    #[test]
    fn degenerate_params_never_produce_nan() {
        let params = TimingParams {
            bandwidth_mbps: 0.0,
            agent_slots: 0,
            working_hours_per_day: 0.0,
            effective_vms_per_day: 0.0,
            deadline_days: Some(10.0),
        };
        let est = estimate(&[make_cohort(0, 4, 100, 9000.0)], &params);
        let t = &est.totals;
        for v in [t.transfer_hours, t.cutover_hours, t.total_hours, t.bandwidth_days, t.schedule_days] {
            assert!(v.is_finite());
        }
        assert_eq!(t.bandwidth_days, 0.0);
        assert_eq!(t.schedule_days, 0.0);
    }

    #[test]
    fn what_if_reports_deltas() {
        let cohorts = [make_cohort(0, 10, 40, 1024.0), make_cohort(1, 5, 80, 4096.0)];
        let baseline = make_params(None);
        let scenario = TimingParams {
            bandwidth_mbps: 2000.0,
            effective_vms_per_day: 80.0,
            ..baseline.clone()
        };
        let cmp = what_if(&cohorts, &baseline, &scenario);
        assert!(cmp.bandwidth_days_delta < 0.0);
        assert!(close(cmp.schedule_days_delta, -1.5));
        assert!(close(
            cmp.bandwidth_days_delta,
            cmp.scenario.totals.bandwidth_days - cmp.baseline.totals.bandwidth_days
        ));
    }

    #[test]
    fn serializes_binding_model_by_name() {
        let est = estimate(&[make_cohort(0, 10, 40, 1024.0)], &make_params(None));
        let value = serde_json::to_value(&est).unwrap();
        assert_eq!(value["totals"]["binding_model"], "schedule");
        assert_eq!(value["per_cohort"][0]["name"], "Cohort 1");
    }

    #[test]
    fn same_params_yield_zero_delta() {
        let cohorts = [make_cohort(0, 2, 10, 100.0)];
        let p = make_params(None);
        let cmp = what_if(&cohorts, &p, &p);
        assert_eq!(cmp.bandwidth_days_delta, 0.0);
        assert_eq!(cmp.schedule_days_delta, 0.0);
    }
}
