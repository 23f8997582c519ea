//! Wave builder.
//!
//! 1. Filter the input to the requested cohort and set aside VMs that
//!    cannot be placed (empty or duplicate name, zero wave cap)
//! 2. Order and group the rest by strategy
//! 3. Number and summarize the resulting waves
//!
//! Every sort is stable, so input order breaks all remaining ties.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};
use waveplan_core::{RiskCategory, VmRecord, WaveStrategy};

use crate::wave::{WaveBuild, WaveOptions, WavePreview};

/// A wave before numbering.
struct Batch<'a> {
    pilot: bool,
    vms: Vec<&'a VmRecord>,
}

impl<'a> Batch<'a> {
    fn regular(vms: Vec<&'a VmRecord>) -> Self {
        Self { pilot: false, vms }
    }
}

/// Split `vms` into ordered waves using `options.strategy`.
pub fn build_waves(vms: &[VmRecord], options: &WaveOptions) -> WaveBuild {
    let mut build = WaveBuild::default();
    let eligible = admit(vms, options, &mut build);

    let batches = match options.strategy {
        WaveStrategy::PilotFirst => pilot_first(&eligible, options, &mut build.warnings),
        WaveStrategy::ByTenant => by_tenant(&eligible, options.max_vms_per_wave),
        WaveStrategy::ByRisk => by_risk(&eligible, options.max_vms_per_wave),
        WaveStrategy::ByPriority => by_priority(&eligible, options.max_vms_per_wave),
        WaveStrategy::Balanced => balanced(&eligible, options.max_vms_per_wave),
    };

    let mut regular = 0;
    for batch in batches.into_iter().filter(|b| !b.vms.is_empty()) {
        let name = if batch.pilot {
            "Pilot".to_string()
        } else {
            regular += 1;
            format!("Wave {regular}")
        };
        let wave = WavePreview::from_vms(
            build.waves.len(),
            name,
            batch.pilot,
            options.cohort_id.clone(),
            &batch.vms,
        );
        debug!(
            wave = %wave.name,
            wave_type = wave.wave_type.as_str(),
            vms = wave.vm_count,
            disk_gb = wave.total_disk_gb,
            "built wave"
        );
        build.waves.push(wave);
    }

    info!(
        strategy = %options.strategy,
        waves = build.waves.len(),
        vms = build.vm_count(),
        unassigned = build.unassigned_vm_ids.len(),
        "wave build complete"
    );
    build
}

/// VMs that may be placed, in input order. Everything else in the
/// requested cohort goes to `unassigned_vm_ids` with a warning.
fn admit<'a>(vms: &'a [VmRecord], options: &WaveOptions, build: &mut WaveBuild) -> Vec<&'a VmRecord> {
    let in_scope = vms.iter().filter(|vm| match &options.cohort_id {
        Some(id) => vm.cohort.as_deref() == Some(id.as_str()),
        None => true,
    });

    let mut seen: HashSet<&str> = HashSet::new();
    let mut eligible = Vec::new();
    for vm in in_scope {
        if vm.vm_name.trim().is_empty() {
            warn!(tenant = %vm.tenant_name, "VM without a name left unassigned");
            build
                .warnings
                .push(format!("VM of tenant {} has no name and was left unassigned", vm.tenant_name));
            build.unassigned_vm_ids.push(vm.vm_name.clone());
        } else if !seen.insert(vm.vm_name.as_str()) {
            warn!(vm = %vm.vm_name, "duplicate VM left unassigned");
            build
                .warnings
                .push(format!("VM {} appears more than once; duplicate left unassigned", vm.vm_name));
            build.unassigned_vm_ids.push(vm.vm_name.clone());
        } else {
            eligible.push(vm);
        }
    }

    if options.max_vms_per_wave == 0 && !eligible.is_empty() {
        warn!(vms = eligible.len(), "wave cap is zero, no VM can be placed");
        build.warnings.push(format!(
            "max_vms_per_wave is 0; {} VMs left unassigned",
            eligible.len()
        ));
        build
            .unassigned_vm_ids
            .extend(eligible.drain(..).map(|vm| vm.vm_name.clone()));
    }
    eligible
}

fn by_disk(a: &&VmRecord, b: &&VmRecord) -> Ordering {
    a.disk_gb().total_cmp(&b.disk_gb())
}

fn priority(vm: &VmRecord) -> u32 {
    vm.tenant_priority.unwrap_or(u32::MAX)
}

fn chunked<'a>(vms: &[&'a VmRecord], cap: usize) -> Vec<Vec<&'a VmRecord>> {
    if cap == 0 {
        return Vec::new();
    }
    vms.chunks(cap).map(|c| c.to_vec()).collect()
}

/// Smallest GREEN VMs first as the pilot, never padded. The rest follow
/// GREEN, YELLOW, RED, each disk ascending.
fn pilot_first<'a>(vms: &[&'a VmRecord], options: &WaveOptions, warnings: &mut Vec<String>) -> Vec<Batch<'a>> {
    let mut greens: Vec<&VmRecord> = vms
        .iter()
        .copied()
        .filter(|vm| vm.risk_category == RiskCategory::Green)
        .collect();
    greens.sort_by(by_disk);
    let pilot: Vec<&VmRecord> = greens.into_iter().take(options.pilot_vm_count).collect();

    if !vms.is_empty() && pilot.len() < options.pilot_vm_count {
        let msg = if pilot.is_empty() {
            "No GREEN VMs qualify for the pilot wave; pilot skipped".to_string()
        } else {
            format!(
                "Pilot wave holds {} of {} requested VMs; no other GREEN VM is available",
                pilot.len(),
                options.pilot_vm_count
            )
        };
        warn!(requested = options.pilot_vm_count, qualified = pilot.len(), "short pilot wave");
        warnings.push(msg);
    }

    let in_pilot: HashSet<&str> = pilot.iter().map(|vm| vm.vm_name.as_str()).collect();
    let mut rest: Vec<&VmRecord> = vms
        .iter()
        .copied()
        .filter(|vm| !in_pilot.contains(vm.vm_name.as_str()))
        .collect();
    rest.sort_by(|a, b| a.risk_category.cmp(&b.risk_category).then_with(|| by_disk(a, b)));

    let mut batches = vec![Batch { pilot: true, vms: pilot }];
    batches.extend(chunked(&rest, options.max_vms_per_wave).into_iter().map(Batch::regular));
    batches
}

/// One wave per tenant (split on the cap), tenants by priority then name.
fn by_tenant<'a>(vms: &[&'a VmRecord], cap: usize) -> Vec<Batch<'a>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, u32, Vec<&'a VmRecord>)> = Vec::new();
    for &vm in vms {
        let slot = *index.entry(vm.tenant_name.as_str()).or_insert_with(|| {
            groups.push((vm.tenant_name.as_str(), u32::MAX, Vec::new()));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.1 = group.1.min(priority(vm));
        group.2.push(vm);
    }
    groups.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    groups
        .iter()
        .flat_map(|(_, _, members)| chunked(members, cap))
        .map(Batch::regular)
        .collect()
}

/// GREEN waves, then YELLOW, then RED. Categories never share a wave.
fn by_risk<'a>(vms: &[&'a VmRecord], cap: usize) -> Vec<Batch<'a>> {
    [RiskCategory::Green, RiskCategory::Yellow, RiskCategory::Red]
        .into_iter()
        .flat_map(|category| {
            let members: Vec<&VmRecord> = vms
                .iter()
                .copied()
                .filter(|vm| vm.risk_category == category)
                .collect();
            chunked(&members, cap)
        })
        .map(Batch::regular)
        .collect()
}

/// Tenant priority order, split on the cap. Waves may mix tenants.
fn by_priority<'a>(vms: &[&'a VmRecord], cap: usize) -> Vec<Batch<'a>> {
    let mut ordered = vms.to_vec();
    ordered.sort_by(|a, b| {
        priority(a)
            .cmp(&priority(b))
            .then_with(|| a.tenant_name.cmp(&b.tenant_name))
    });
    chunked(&ordered, cap).into_iter().map(Batch::regular).collect()
}

/// `ceil(n / cap)` waves. Largest VMs first, each into the wave with the
/// least disk that still has room (ties: fewer VMs, then lower index).
fn balanced<'a>(vms: &[&'a VmRecord], cap: usize) -> Vec<Batch<'a>> {
    if cap == 0 || vms.is_empty() {
        return Vec::new();
    }
    let mut ordered = vms.to_vec();
    ordered.sort_by(|a, b| by_disk(b, a));

    let mut waves: Vec<(f64, Vec<&VmRecord>)> = vec![(0.0, Vec::new()); vms.len().div_ceil(cap)];
    for vm in ordered {
        let target = waves
            .iter()
            .enumerate()
            .filter(|(_, (_, members))| members.len() < cap)
            .min_by(|(ia, (da, ma)), (ib, (db, mb))| {
                da.total_cmp(db)
                    .then_with(|| ma.len().cmp(&mb.len()))
                    .then_with(|| ia.cmp(ib))
            })
            .map(|(i, _)| i);
        // capacity is ceil(n / cap) * cap >= n, so a slot always has room
        let Some(i) = target else { break };
        waves[i].0 += vm.disk_gb();
        waves[i].1.push(vm);
    }

    waves.into_iter().map(|(_, members)| Batch::regular(members)).collect()
}
