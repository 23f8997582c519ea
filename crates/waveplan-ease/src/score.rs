//! Tenant ease scoring.
//!
//! Each dimension maps a raw footprint value onto `[0, weight]` with a
//! linear, capped curve shared by every tenant. The total is the plain sum
//! of the dimension points, so it never exceeds `weights.total()`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use waveplan_core::{EaseDimension, EaseWeights, ScoredTenant, TenantFootprint, ratio_signal, signal};

/// Scores below this are labelled Easy.
pub const EASY_BELOW: f64 = 30.0;
/// Scores below this (and at least [`EASY_BELOW`]) are labelled Medium.
pub const MEDIUM_BELOW: f64 = 60.0;

/// Used disk at which the disk dimension saturates.
pub const DISK_SCALE_GB: f64 = 2048.0;
/// VM count at which the vm_count dimension saturates.
pub const VM_COUNT_SCALE: f64 = 50.0;
/// Distinct networks at which the networks dimension saturates.
pub const NETWORK_SCALE: f64 = 5.0;
/// Cross-tenant dependencies at which the deps dimension saturates.
pub const DEPS_SCALE: f64 = 5.0;

/// Coarse difficulty bucket derived from an ease score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaseLabel {
    Easy,
    Medium,
    Hard,
}

impl EaseLabel {
    pub fn from_score(score: f64) -> Self {
        if score < EASY_BELOW {
            EaseLabel::Easy
        } else if score < MEDIUM_BELOW {
            EaseLabel::Medium
        } else {
            EaseLabel::Hard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EaseLabel::Easy => "Easy",
            EaseLabel::Medium => "Medium",
            EaseLabel::Hard => "Hard",
        }
    }
}

/// Ease score with its per-dimension breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EaseScore {
    /// Sum of `breakdown` (lower = easier).
    pub total: f64,
    pub label: EaseLabel,
    pub breakdown: BTreeMap<EaseDimension, f64>,
    /// Weight table the score was computed with.
    pub weights: EaseWeights,
}

/// Linear ramp from 0 at `raw = 0` to `weight` at `raw = scale`, capped.
fn capped(raw: f64, scale: f64, weight: f64) -> f64 {
    if weight <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    (raw / scale * weight).min(weight)
}

/// Points contributed by one dimension.
pub fn dimension_points(
    footprint: &TenantFootprint,
    dimension: EaseDimension,
    weight: f64,
) -> f64 {
    let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
    match dimension {
        EaseDimension::Disk => capped(footprint.used_disk_gb(), DISK_SCALE_GB, weight),
        EaseDimension::Risk => footprint.risk_score() / 100.0 * weight,
        // Missing OS support is no signal, not "0% supported".
        EaseDimension::Os => match footprint.os_support_pct() {
            Some(pct) => (1.0 - pct / 100.0) * weight,
            None => 0.0,
        },
        EaseDimension::VmCount => capped(f64::from(footprint.vm_count), VM_COUNT_SCALE, weight),
        EaseDimension::Networks => capped(
            signal(footprint.network_count.map(f64::from)),
            NETWORK_SCALE,
            weight,
        ),
        EaseDimension::Deps => capped(
            signal(footprint.cross_tenant_dep_count.map(f64::from)),
            DEPS_SCALE,
            weight,
        ),
        EaseDimension::Cold => ratio_signal(footprint.cold_vm_ratio) * weight,
        EaseDimension::Unconf => ratio_signal(footprint.unconfirmed_ratio) * weight,
    }
}

/// Score a single tenant.
pub fn compute_ease_score(footprint: &TenantFootprint, weights: &EaseWeights) -> EaseScore {
    let breakdown: BTreeMap<EaseDimension, f64> = EaseDimension::ALL
        .iter()
        .map(|d| (*d, dimension_points(footprint, *d, weights.get(*d))))
        .collect();
    let total: f64 = breakdown.values().sum();

    EaseScore {
        total,
        label: EaseLabel::from_score(total),
        breakdown,
        weights: weights.clone(),
    }
}

/// Score every tenant, keeping input order.
pub fn score_tenants(footprints: &[TenantFootprint], weights: &EaseWeights) -> Vec<ScoredTenant> {
    let scored: Vec<ScoredTenant> = footprints
        .iter()
        .map(|f| ScoredTenant::new(f.clone(), compute_ease_score(f, weights).total))
        .collect();
    debug!(tenants = scored.len(), "scored tenants");
    scored
}

/// Score every tenant and sort easiest first (ties by tenant id).
pub fn rank_tenants(footprints: &[TenantFootprint], weights: &EaseWeights) -> Vec<ScoredTenant> {
    let mut scored = score_tenants(footprints, weights);
    scored.sort_by(|a, b| {
        a.ease_score
            .total_cmp(&b.ease_score)
            .then_with(|| a.footprint.id.cmp(&b.footprint.id))
    });
    scored
}
