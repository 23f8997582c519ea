//! Human-readable report formatting.

use waveplan_cohort::CohortPlan;
use waveplan_core::ScoredTenant;
use waveplan_ease::EaseLabel;
use waveplan_timing::{PlanEstimate, WhatIf};
use waveplan_waves::WaveBuild;

fn banner(out: &mut String, title: &str, project: &str, detail: &str) {
    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str(&format!("║  {:<40}║\n", title));
    out.push_str("╠══════════════════════════════════════════╣\n");
    out.push_str(&format!("║  Project:  {:<30}║\n", project));
    out.push_str(&format!("║  {:<40}║\n", detail));
    out.push_str("╚══════════════════════════════════════════╝\n\n");
}

fn warnings(out: &mut String, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str(&format!("⚠️  WARNINGS ({}):\n\n", warnings.len()));
    for w in warnings {
        out.push_str(&format!("  • {w}\n"));
    }
    out.push('\n');
}

pub fn format_pack(project: &str, ranked: &[ScoredTenant], plan: &CohortPlan, fingerprint: &str) -> String {
    let mut out = String::new();
    banner(
        &mut out,
        "waveplan Cohort Proposal",
        project,
        &format!("Strategy: {}", plan.strategy),
    );

    out.push_str(&format!("Tenants ({} total, easiest first):\n", ranked.len()));
    for t in ranked {
        out.push_str(&format!(
            "  {:<24} {:>6.1}  {:<6}  {} VMs\n",
            t.footprint.name,
            t.ease_score,
            EaseLabel::from_score(t.ease_score).as_str(),
            t.footprint.vm_count
        ));
    }
    out.push('\n');

    out.push_str("Cohorts:\n\n");
    for c in &plan.cohorts {
        let sink = if c.overflow_sink { " (overflow sink)" } else { "" };
        out.push_str(&format!("  {}. {}{}\n", c.index + 1, c.name, sink));
        out.push_str(&format!(
            "     {} tenants, {} VMs, {:.2} TB\n",
            c.tenant_count,
            c.vm_count,
            c.total_disk_gb / 1024.0
        ));
        out.push_str(&format!(
            "     Avg risk {:.1}, avg ease {:.1}",
            c.avg_risk_score, c.avg_ease_score
        ));
        if let Some(os) = c.avg_os_support_pct {
            out.push_str(&format!(", OS support {os:.0}%"));
        }
        out.push('\n');
        if !c.tenant_ids.is_empty() {
            out.push_str(&format!("     Tenants: {}\n", c.tenant_ids.join(", ")));
        }
        out.push('\n');
    }

    warnings(&mut out, &plan.warnings);
    out.push_str(&format!("Fingerprint: {fingerprint}\n"));
    out
}

pub fn format_estimate(project: &str, estimate: &PlanEstimate) -> String {
    let mut out = String::new();
    let deadline = match estimate.deadline_days {
        Some(d) => format!("Deadline: {d:.1} days"),
        None => "Deadline: none".to_string(),
    };
    banner(&mut out, "waveplan Timing Estimate", project, &deadline);

    out.push_str(&format!(
        "  {:<16} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "Cohort", "Transfer h", "Cutover h", "Total h", "BW days", "Sched days"
    ));
    for c in &estimate.per_cohort {
        out.push_str(&format!(
            "  {:<16} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n",
            c.name, c.transfer_hours, c.cutover_hours, c.total_hours, c.bandwidth_days, c.schedule_days
        ));
    }
    let t = &estimate.totals;
    out.push_str(&format!(
        "  {:<16} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n\n",
        "TOTAL", t.transfer_hours, t.cutover_hours, t.total_hours, t.bandwidth_days, t.schedule_days
    ));

    out.push_str(&format!(
        "Binding model: {} ({:.2} days)\n",
        t.binding_model.label(),
        t.binding_days()
    ));
    if t.bandwidth_exceeds_deadline {
        out.push_str("  ❌ Bandwidth-bound estimate exceeds the deadline\n");
    }
    if t.schedule_exceeds_deadline {
        out.push_str("  ❌ Schedule-bound estimate exceeds the deadline\n");
    }
    out
}

pub fn format_what_if(cmp: &WhatIf) -> String {
    let mut out = String::new();
    out.push_str("\nWHAT-IF (scenario vs baseline):\n\n");
    out.push_str(&format!(
        "  Bandwidth days: {:.2} → {:.2} ({:+.2})\n",
        cmp.baseline.totals.bandwidth_days, cmp.scenario.totals.bandwidth_days, cmp.bandwidth_days_delta
    ));
    out.push_str(&format!(
        "  Schedule days:  {:.2} → {:.2} ({:+.2})\n",
        cmp.baseline.totals.schedule_days, cmp.scenario.totals.schedule_days, cmp.schedule_days_delta
    ));
    out.push_str(&format!(
        "  Binding model:  {} → {}\n",
        cmp.baseline.totals.binding_model.label(),
        cmp.scenario.totals.binding_model.label()
    ));
    out
}

pub fn format_waves(project: &str, strategy: &str, build: &WaveBuild, fingerprint: &str) -> String {
    let mut out = String::new();
    banner(
        &mut out,
        "waveplan Wave Preview",
        project,
        &format!("Strategy: {strategy}"),
    );

    for w in &build.waves {
        out.push_str(&format!(
            "  {}. {} [{}] {} VMs, {:.1} GB  (G{} Y{} R{})\n",
            w.index + 1,
            w.name,
            w.wave_type.as_str(),
            w.vm_count,
            w.total_disk_gb,
            w.green_count,
            w.yellow_count,
            w.red_count
        ));
        out.push_str(&format!("     Tenants: {}\n", w.tenant_names.join(", ")));
    }
    out.push('\n');

    if !build.unassigned_vm_ids.is_empty() {
        out.push_str(&format!("❌ UNASSIGNED ({}):\n", build.unassigned_vm_ids.len()));
        for id in &build.unassigned_vm_ids {
            out.push_str(&format!("  • {id:?}\n"));
        }
        out.push('\n');
    }
    warnings(&mut out, &build.warnings);
    out.push_str(&format!("Fingerprint: {fingerprint}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveplan_cohort::pack;
    use waveplan_core::{CohortLayout, Guardrails, PackStrategy, RiskCategory, TenantFootprint, VmRecord};
    use waveplan_timing::{TimingParams, estimate, what_if};
    use waveplan_waves::{WaveOptions, build_waves};

    fn make_tenant(id: &str, vms: u32, disk: f64, ease: f64) -> ScoredTenant {
        ScoredTenant::new(
            TenantFootprint {
                vm_count: vms,
                total_used_disk_gb: Some(disk),
                avg_risk_score: Some(ease),
                ..TenantFootprint::new(id, &format!("tenant-{id}"))
            },
            ease,
        )
    }

    fn make_params() -> TimingParams {
        TimingParams {
            bandwidth_mbps: 1000.0,
            agent_slots: 2,
            working_hours_per_day: 8.0,
            effective_vms_per_day: 10.0,
            deadline_days: Some(1.0),
        }
    }

    fn sample_plan() -> (Vec<ScoredTenant>, CohortPlan) {
        let tenants = vec![make_tenant("a", 10, 200.0, 12.0), make_tenant("b", 30, 900.0, 70.0)];
        let guardrails = Guardrails {
            max_vms_per_cohort: Some(15),
            ..Default::default()
        };
        let plan = pack(
            &tenants,
            &PackStrategy::EasiestFirst,
            &CohortLayout::Uniform { count: 2 },
            &guardrails,
        )
        .unwrap();
        (tenants, plan)
    }

    #[test]
    fn test_pack_report_lists_cohorts_and_warnings() {
        let (tenants, plan) = sample_plan();
        let fingerprint = plan.fingerprint().unwrap();
        let text = format_pack("dc1", &tenants, &plan, &fingerprint);
        assert!(text.contains("Project:  dc1"));
        assert!(text.contains("Strategy: easiest_first"));
        assert!(text.contains("tenant-a"));
        assert!(text.contains("Easy"));
        assert!(text.contains("Hard"));
        assert!(text.contains("Cohort 2 (overflow sink)"));
        assert!(text.contains("Cohort 2 VM count 30 exceeds cap of 15"));
        assert!(text.contains(&format!("Fingerprint: {fingerprint}")));
    }

    #[test]
    fn test_estimate_report_flags_deadline() {
        let (_, plan) = sample_plan();
        let est = estimate(&plan.cohorts, &make_params());
        let text = format_estimate("dc1", &est);
        assert!(text.contains("TOTAL"));
        assert!(text.contains("Deadline: 1.0 days"));
        // 40 VMs at 10/day is 4 days
        assert!(text.contains("Binding model: schedule (4.00 days)"));
        assert!(text.contains("Schedule-bound estimate exceeds the deadline"));
        assert!(!text.contains("Bandwidth-bound estimate exceeds"));
    }

    #[test]
    fn test_what_if_report_shows_signed_delta() {
        let (_, plan) = sample_plan();
        let scenario = TimingParams {
            effective_vms_per_day: 20.0,
            ..make_params()
        };
        let text = format_what_if(&what_if(&plan.cohorts, &make_params(), &scenario));
        assert!(text.contains("Schedule days:  4.00 → 2.00 (-2.00)"));
        assert!(text.contains("(+0.00)"));
    }

    #[test]
    fn test_wave_report() {
        let vms = vec![
            VmRecord::new("v1", "alpha", RiskCategory::Green),
            VmRecord::new("v2", "alpha", RiskCategory::Red),
            VmRecord::new("v1", "alpha", RiskCategory::Red),
        ];
        let build = build_waves(&vms, &WaveOptions::default());
        let text = format_waves("dc1", "pilot_first", &build, &build.fingerprint().unwrap());
        assert!(text.contains("1. Pilot [pilot] 1 VMs"));
        assert!(text.contains("2. Wave 1 [cleanup] 1 VMs"));
        assert!(text.contains("UNASSIGNED (1)"));
        assert!(text.contains("WARNINGS"));
    }
}
