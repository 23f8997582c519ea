pub mod estimate;
pub mod init;
pub mod pack;
pub mod waves;

use std::path::Path;

use anyhow::Context;
use tracing::info;
use waveplan_cohort::CohortPlan;
use waveplan_core::{Inventory, PlanConfig, ScoredTenant};

/// Configuration and inventory, both validated.
pub(crate) struct Loaded {
    pub config: PlanConfig,
    pub inventory: Inventory,
}

pub(crate) fn load(config_path: &str, inventory_path: &str) -> anyhow::Result<Loaded> {
    let config = PlanConfig::from_file(Path::new(config_path))
        .with_context(|| format!("reading config {config_path}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config {config_path}"))?;

    let content = std::fs::read_to_string(inventory_path)
        .with_context(|| format!("reading inventory {inventory_path}"))?;
    let inventory = Inventory::from_json(&content)
        .with_context(|| format!("parsing inventory {inventory_path}"))?;

    info!(
        project = %config.project.name,
        tenants = inventory.tenants.len(),
        vms = inventory.vms.len(),
        "loaded plan inputs"
    );
    Ok(Loaded { config, inventory })
}

/// Score every tenant and pack them with the configured strategy.
pub(crate) fn propose(loaded: &Loaded) -> anyhow::Result<(Vec<ScoredTenant>, CohortPlan)> {
    let config = &loaded.config;
    let scored = waveplan_ease::score_tenants(&loaded.inventory.tenants, &config.ease);
    let plan = waveplan_cohort::pack(
        &scored,
        &config.cohorts.strategy(),
        &config.cohorts.layout()?,
        &config.guardrails,
    )?;
    Ok((scored, plan))
}
