use std::collections::HashMap;

use tracing::debug;
use waveplan_cohort::CohortPlan;
use waveplan_core::{TenantFootprint, VmRecord};
use waveplan_waves::{WaveOptions, build_waves};

use crate::commands::{load, propose};
use crate::report;

/// Build and print waves for the inventory's VMs.
pub fn waves(config: &str, inventory: &str, format: &str, cohort: Option<String>) -> anyhow::Result<()> {
    println!("{}", render(config, inventory, format, cohort)?);
    Ok(())
}

fn render(config: &str, inventory: &str, format: &str, cohort: Option<String>) -> anyhow::Result<String> {
    let loaded = load(config, inventory)?;
    let options = WaveOptions::from_config(&loaded.config.waves, cohort);

    let vms = if options.cohort_id.is_some() {
        let (_, plan) = propose(&loaded)?;
        tag_untagged(&loaded.inventory.vms, &loaded.inventory.tenants, &plan)
    } else {
        loaded.inventory.vms.clone()
    };

    let build = build_waves(&vms, &options);
    Ok(match format {
        "json" => serde_json::to_string_pretty(&build)?,
        _ => report::format_waves(
            &loaded.config.project.name,
            options.strategy.name(),
            &build,
            &build.fingerprint()?,
        ),
    })
}

/// VMs without a cohort tag take the cohort the proposal puts their
/// tenant in. Existing tags are kept.
fn tag_untagged(vms: &[VmRecord], tenants: &[TenantFootprint], plan: &CohortPlan) -> Vec<VmRecord> {
    let by_tenant: HashMap<&str, &str> = tenants
        .iter()
        .filter_map(|t| {
            let idx = plan.cohort_of(&t.id)?;
            Some((t.name.as_str(), plan.cohorts[idx].name.as_str()))
        })
        .collect();

    vms.iter()
        .map(|vm| {
            let mut vm = vm.clone();
            if vm.cohort.is_none() {
                vm.cohort = by_tenant.get(vm.tenant_name.as_str()).map(|c| c.to_string());
                debug!(vm = %vm.vm_name, cohort = ?vm.cohort, "tagged VM from proposal");
            }
            vm
        })
        .collect()
}
