//! Cohort packer: orders tenants by strategy and fills cohorts in order.
//!
//! Given scored tenants, a cohort layout and guardrails, the packer:
//! 1. Orders tenants according to the [`PackStrategy`]
//! 2. Walks the order, keeping a cursor on the current cohort and
//!    advancing it whenever the next tenant would breach a cap
//! 3. Drops whatever is left into the last cohort (the overflow sink)
//!    and reports every guardrail the final cohorts breach
//!
//! `balanced_load` is the exception to step 2: it picks the feasible
//! cohort with the least disk for each tenant instead of using a cursor.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use waveplan_core::{
    CohortLayout, ConfigError, Guardrails, OsFamily, PackStrategy, ScoredTenant,
};
use waveplan_ease::EASY_BELOW;

use crate::error::{PackError, PackResult};
use crate::rollup::{CohortAssignment, CohortLimits, Rollup};

/// The packer's proposal: cohorts in layout order plus guardrail warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortPlan {
    pub strategy: PackStrategy,
    pub cohorts: Vec<CohortAssignment>,
    pub warnings: Vec<String>,
}

impl CohortPlan {
    /// Index of the cohort holding `tenant_id`.
    pub fn cohort_of(&self, tenant_id: &str) -> Option<usize> {
        self.cohorts
            .iter()
            .position(|c| c.tenant_ids.iter().any(|id| id == tenant_id))
    }

    pub fn tenant_count(&self) -> usize {
        self.cohorts.iter().map(|c| c.tenant_count).sum()
    }

    /// SHA-256 of the plan's JSON form. Identical inputs give identical
    /// fingerprints, so a preview can be matched to a later apply.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Working state for one cohort during a pack.
struct Slot {
    name: String,
    limits: CohortLimits,
    rollup: Rollup,
    tenant_ids: Vec<String>,
}

struct Packer {
    slots: Vec<Slot>,
    /// Uniform tenant quotas apply to cursor fills only.
    use_quota: bool,
    warnings: Vec<String>,
}

impl Packer {
    fn new(layout: &CohortLayout, guardrails: &Guardrails, tenant_count: usize) -> Self {
        let profiles = layout.profiles();
        let last = profiles.len().saturating_sub(1);
        let quota = match layout {
            CohortLayout::Uniform { count } if *count > 0 => Some(tenant_count.div_ceil(*count)),
            _ => None,
        };
        let guardrail_vms = guardrails.max_vms_per_cohort.map(u64::from);

        let slots = profiles
            .into_iter()
            .enumerate()
            .map(|(i, profile)| {
                let max_vms = match (profile.max_vms.map(u64::from), guardrail_vms) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                Slot {
                    name: profile.name,
                    limits: CohortLimits {
                        max_vms,
                        max_disk_gb: guardrails.max_disk_gb(),
                        max_avg_risk: guardrails.max_avg_risk_pct,
                        min_os_support: guardrails.min_os_support_pct,
                        max_tenants: if i < last { quota } else { None },
                    },
                    rollup: Rollup::default(),
                    tenant_ids: Vec::new(),
                }
            })
            .collect();

        Self {
            slots,
            use_quota: true,
            warnings: Vec::new(),
        }
    }

    fn last(&self) -> usize {
        self.slots.len() - 1
    }

    fn place(&mut self, index: usize, tenant: &ScoredTenant) {
        let slot = &mut self.slots[index];
        slot.rollup = slot.rollup.with(tenant);
        slot.tenant_ids.push(tenant.footprint.id.clone());
        debug!(
            tenant = %tenant.footprint.id,
            cohort = %slot.name,
            ease = tenant.ease_score,
            "placed tenant"
        );
    }

    fn admits(&self, index: usize, tenant: &ScoredTenant) -> bool {
        let slot = &self.slots[index];
        slot.limits.admits(&slot.rollup.with(tenant), self.use_quota)
    }

    /// Cursor fill starting at `start`. Returns the cursor's final position.
    fn fill_in_order(&mut self, order: &[&ScoredTenant], start: usize) -> usize {
        let last = self.last();
        let mut cursor = start.min(last);
        for tenant in order {
            while cursor < last && !self.admits(cursor, tenant) {
                debug!(
                    tenant = %tenant.footprint.id,
                    cohort = %self.slots[cursor].name,
                    "cohort full, advancing"
                );
                cursor += 1;
            }
            self.place(cursor, tenant);
        }
        cursor
    }

    /// Least-disk feasible cohort per tenant; sink when none fits.
    fn fill_balanced(&mut self, order: &[&ScoredTenant]) {
        for tenant in order {
            let target = (0..self.slots.len())
                .filter(|i| self.admits(*i, tenant))
                .min_by(|a, b| {
                    self.slots[*a]
                        .rollup
                        .disk_gb
                        .total_cmp(&self.slots[*b].rollup.disk_gb)
                        .then(a.cmp(b))
                })
                .unwrap_or_else(|| self.last());
            self.place(target, tenant);
        }
    }

    fn finish(mut self, strategy: &PackStrategy) -> CohortPlan {
        let last = self.last();
        let mut cohorts = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            for w in slot.limits.warnings(&slot.name, &slot.rollup) {
                warn!(cohort = %slot.name, "{w}");
                self.warnings.push(w);
            }
            cohorts.push(CohortAssignment {
                index,
                tenant_count: slot.tenant_ids.len(),
                tenant_ids: slot.tenant_ids,
                vm_count: slot.rollup.vm_count,
                total_disk_gb: slot.rollup.disk_gb,
                avg_risk_score: slot.rollup.avg_risk().unwrap_or(0.0),
                avg_ease_score: slot.rollup.avg_ease(),
                avg_os_support_pct: slot.rollup.avg_os_support(),
                overflow_sink: index == last,
                name: slot.name,
            });
        }

        CohortPlan {
            strategy: strategy.clone(),
            cohorts,
            warnings: self.warnings,
        }
    }
}

/// Stable ease-ascending order.
fn by_ease<'a>(tenants: impl IntoIterator<Item = &'a ScoredTenant>) -> Vec<&'a ScoredTenant> {
    let mut order: Vec<&ScoredTenant> = tenants.into_iter().collect();
    order.sort_by(|a, b| a.ease_score.total_cmp(&b.ease_score));
    order
}

fn validate(
    tenants: &[ScoredTenant],
    strategy: &PackStrategy,
    layout: &CohortLayout,
    guardrails: &Guardrails,
) -> PackResult<()> {
    layout.validate()?;
    guardrails.validate()?;
    if let PackStrategy::RiskiestLast {
        risk_threshold: Some(value),
    } = strategy
    {
        if !value.is_finite() || *value < 0.0 {
            return Err(ConfigError::InvalidGuardrail {
                field: "risk_threshold",
                value: *value,
            }
            .into());
        }
    }

    let mut seen = HashSet::with_capacity(tenants.len());
    for t in tenants {
        if !seen.insert(t.footprint.id.as_str()) {
            return Err(PackError::DuplicateTenant(t.footprint.id.clone()));
        }
    }
    Ok(())
}

/// Assign every tenant to exactly one cohort.
///
/// Configuration is validated before anything is placed. The result is a
/// pure function of the arguments.
pub fn pack(
    tenants: &[ScoredTenant],
    strategy: &PackStrategy,
    layout: &CohortLayout,
    guardrails: &Guardrails,
) -> PackResult<CohortPlan> {
    validate(tenants, strategy, layout, guardrails)?;

    let mut packer = Packer::new(layout, guardrails, tenants.len());

    match strategy {
        PackStrategy::EasiestFirst => {
            packer.fill_in_order(&by_ease(tenants), 0);
        }

        PackStrategy::RiskiestLast { risk_threshold } => {
            let threshold = guardrails.risk_threshold(*risk_threshold);
            let (risky, rest): (Vec<&ScoredTenant>, Vec<&ScoredTenant>) = by_ease(tenants)
                .into_iter()
                .partition(|t| t.footprint.risk_score() >= threshold);
            let sink = packer.last();
            for tenant in &risky {
                packer.place(sink, tenant);
            }
            debug!(risky = risky.len(), threshold, "routed risky tenants to last cohort");
            packer.fill_in_order(&rest, 0);
        }

        PackStrategy::PilotBulk => {
            let requested = guardrails.pilot_size();
            let order = by_ease(tenants);
            let pilot_len = order
                .iter()
                .take(requested)
                .take_while(|t| t.ease_score < EASY_BELOW)
                .count();
            let (pilot, rest) = order.split_at(pilot_len);
            for tenant in pilot {
                packer.place(0, tenant);
            }
            if !order.is_empty() && pilot_len < requested {
                let pilot_name = &packer.slots[0].name;
                let msg = if pilot_len == order.len() {
                    format!(
                        "{pilot_name} holds {pilot_len} of {requested} requested pilot tenants; only {} tenants to pack",
                        order.len()
                    )
                } else {
                    format!(
                        "{pilot_name} holds {pilot_len} of {requested} requested pilot tenants; no other tenant qualifies as Easy"
                    )
                };
                warn!(requested, qualified = pilot_len, "short pilot cohort");
                packer.warnings.push(msg);
            }
            packer.fill_in_order(rest, 1);
        }

        PackStrategy::BalancedLoad => {
            let mut order: Vec<&ScoredTenant> = tenants.iter().collect();
            order.sort_by(|a, b| {
                b.footprint
                    .used_disk_gb()
                    .total_cmp(&a.footprint.used_disk_gb())
            });
            packer.use_quota = false;
            packer.fill_balanced(&order);
        }

        PackStrategy::OsFirst => {
            let (linux, windows): (Vec<&ScoredTenant>, Vec<&ScoredTenant>) = by_ease(tenants)
                .into_iter()
                .partition(|t| t.footprint.dominant_os() == OsFamily::Linux);
            let windows_start = if linux.is_empty() {
                0
            } else {
                packer.fill_in_order(&linux, 0) + 1
            };
            packer.fill_in_order(&windows, windows_start);
        }

        PackStrategy::ByPriority => {
            let mut order = by_ease(tenants);
            order.sort_by_key(|t| t.footprint.migration_priority.unwrap_or(u32::MAX));
            packer.fill_in_order(&order, 0);
        }
    }

    let plan = packer.finish(strategy);
    info!(
        strategy = %strategy,
        tenants = plan.tenant_count(),
        cohorts = plan.cohorts.len(),
        warnings = plan.warnings.len(),
        "packed tenants into cohorts"
    );
    Ok(plan)
}
