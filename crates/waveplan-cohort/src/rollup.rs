//! Cohort rollups and guardrail checks.
//!
//! A [`Rollup`] is the running total for one cohort. [`CohortLimits`]
//! holds the effective caps for a cohort (profile cap merged with the
//! guardrails) and answers two questions: may this projected rollup be
//! admitted, and which guardrails does a final rollup breach.

use serde::{Deserialize, Serialize};
use waveplan_core::ScoredTenant;

/// One cohort of the packer's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortAssignment {
    pub index: usize,
    pub name: String,
    /// Tenant ids in placement order.
    pub tenant_ids: Vec<String>,
    pub tenant_count: usize,
    pub vm_count: u64,
    pub total_disk_gb: f64,
    /// Mean tenant risk score over tenants that report one (0 when none do).
    pub avg_risk_score: f64,
    pub avg_ease_score: f64,
    /// Mean OS support over tenants that report one.
    pub avg_os_support_pct: Option<f64>,
    /// True for the last cohort, which accepts anything.
    pub overflow_sink: bool,
}

/// Running totals for one cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Rollup {
    pub tenants: usize,
    pub vm_count: u64,
    pub disk_gb: f64,
    risk_sum: f64,
    risk_n: usize,
    os_sum: f64,
    os_n: usize,
    ease_sum: f64,
}

impl Rollup {
    /// Totals after adding `tenant`.
    pub fn with(self, tenant: &ScoredTenant) -> Rollup {
        let f = &tenant.footprint;
        let mut next = self;
        next.tenants += 1;
        next.vm_count += u64::from(f.vm_count);
        next.disk_gb += f.used_disk_gb();
        if let Some(risk) = f.risk_sample() {
            next.risk_sum += risk;
            next.risk_n += 1;
        }
        if let Some(os) = f.os_support_pct() {
            next.os_sum += os;
            next.os_n += 1;
        }
        next.ease_sum += tenant.ease_score;
        next
    }

    pub fn avg_risk(&self) -> Option<f64> {
        (self.risk_n > 0).then(|| self.risk_sum / self.risk_n as f64)
    }

    pub fn avg_os_support(&self) -> Option<f64> {
        (self.os_n > 0).then(|| self.os_sum / self.os_n as f64)
    }

    pub fn avg_ease(&self) -> f64 {
        if self.tenants == 0 {
            0.0
        } else {
            self.ease_sum / self.tenants as f64
        }
    }
}

/// Effective caps for a single cohort. `None` = unlimited.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CohortLimits {
    pub max_vms: Option<u64>,
    pub max_disk_gb: Option<f64>,
    pub max_avg_risk: Option<f64>,
    pub min_os_support: Option<f64>,
    /// Tenant quota for uniform layouts. Not a guardrail; never warned on.
    pub max_tenants: Option<usize>,
}

impl CohortLimits {
    /// Whether a cohort may grow to `projected`.
    pub fn admits(&self, projected: &Rollup, use_quota: bool) -> bool {
        if use_quota && self.max_tenants.is_some_and(|q| projected.tenants > q) {
            return false;
        }
        self.breaches_at(projected).is_empty()
    }

    fn breaches_at(&self, r: &Rollup) -> Vec<Breach> {
        let mut out = Vec::new();
        if let Some(cap) = self.max_vms {
            if r.vm_count > cap {
                out.push(Breach::Vms { actual: r.vm_count, cap });
            }
        }
        if let Some(cap) = self.max_disk_gb {
            if r.disk_gb > cap {
                out.push(Breach::Disk { actual_gb: r.disk_gb, cap_gb: cap });
            }
        }
        if let (Some(cap), Some(avg)) = (self.max_avg_risk, r.avg_risk()) {
            if avg > cap {
                out.push(Breach::Risk { actual: avg, cap });
            }
        }
        if let (Some(floor), Some(avg)) = (self.min_os_support, r.avg_os_support()) {
            if avg < floor {
                out.push(Breach::OsSupport { actual: avg, floor });
            }
        }
        out
    }

    /// One warning per breached guardrail.
    pub fn warnings(&self, cohort_name: &str, r: &Rollup) -> Vec<String> {
        self.breaches_at(r)
            .into_iter()
            .map(|b| b.describe(cohort_name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Breach {
    Vms { actual: u64, cap: u64 },
    Disk { actual_gb: f64, cap_gb: f64 },
    Risk { actual: f64, cap: f64 },
    OsSupport { actual: f64, floor: f64 },
}

impl Breach {
    fn describe(&self, cohort: &str) -> String {
        match self {
            Breach::Vms { actual, cap } => format!(
                "{cohort} VM count {actual} exceeds cap of {cap} (+{})",
                actual - cap
            ),
            Breach::Disk { actual_gb, cap_gb } => format!(
                "{cohort} disk {:.2} TB exceeds cap of {:.2} TB (+{:.2} TB)",
                actual_gb / 1024.0,
                cap_gb / 1024.0,
                (actual_gb - cap_gb) / 1024.0
            ),
            Breach::Risk { actual, cap } => format!(
                "{cohort} average risk {}% exceeds cap of {}% (+{}%)",
                pct(*actual),
                pct(*cap),
                pct(actual - cap)
            ),
            Breach::OsSupport { actual, floor } => format!(
                "{cohort} OS support {}% is below floor of {}% (-{}%)",
                pct(*actual),
                pct(*floor),
                pct(floor - actual)
            ),
        }
    }
}

/// Whole numbers print bare, everything else with one decimal.
fn pct(v: f64) -> String {
    if (v - v.round()).abs() < 0.05 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
