use tracing::info;
use waveplan_timing::{TimingParams, estimate as estimate_plan, what_if};

use crate::commands::{load, propose};
use crate::report;

/// Scenario overrides for a what-if run.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bandwidth_mbps: Option<f64>,
    pub agents: Option<u32>,
}

impl Overrides {
    fn is_empty(&self) -> bool {
        self.bandwidth_mbps.is_none() && self.agents.is_none()
    }

    /// `baseline` with the overrides applied. A changed agent count
    /// re-derives throughput unless the project pins `target_vms_per_day`.
    fn apply(&self, baseline: &TimingParams, target_vms_per_day: Option<f64>, concurrent_vms: u32) -> TimingParams {
        let mut scenario = baseline.clone();
        if let Some(bw) = self.bandwidth_mbps {
            scenario.bandwidth_mbps = bw;
        }
        if let Some(agents) = self.agents {
            scenario.agent_slots = agents;
            if target_vms_per_day.is_none() {
                scenario.effective_vms_per_day = TimingParams::derived_vms_per_day(
                    agents,
                    concurrent_vms,
                    baseline.working_hours_per_day,
                );
            }
        }
        scenario
    }
}

/// Propose cohorts and print the timing estimate.
pub fn estimate(config: &str, inventory: &str, format: &str, overrides: &Overrides) -> anyhow::Result<()> {
    println!("{}", render(config, inventory, format, overrides)?);
    Ok(())
}

fn render(config: &str, inventory: &str, format: &str, overrides: &Overrides) -> anyhow::Result<String> {
    let loaded = load(config, inventory)?;
    let (_, plan) = propose(&loaded)?;
    let project = &loaded.config.project;

    let baseline = TimingParams::from_project(project);
    baseline.validate()?;

    if overrides.is_empty() {
        let est = estimate_plan(&plan.cohorts, &baseline);
        return Ok(match format {
            "json" => serde_json::to_string_pretty(&est)?,
            _ => report::format_estimate(&project.name, &est),
        });
    }

    let scenario = overrides.apply(&baseline, project.target_vms_per_day, project.agent_concurrent_vms);
    scenario.validate()?;
    info!(
        bandwidth_mbps = scenario.bandwidth_mbps,
        agent_slots = scenario.agent_slots,
        "running what-if scenario"
    );
    let cmp = what_if(&plan.cohorts, &baseline, &scenario);
    Ok(match format {
        "json" => serde_json::to_string_pretty(&cmp)?,
        _ => {
            let mut out = report::format_estimate(&project.name, &cmp.baseline);
            out.push_str(&report::format_what_if(&cmp));
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    fn run(format: &str, overrides: &Overrides) -> anyhow::Result<String> {
        let dir = tempfile::tempdir().unwrap();
        let (config, inventory) = fixtures::write_inputs(dir.path());
        render(config.to_str().unwrap(), inventory.to_str().unwrap(), format, overrides)
    }

    #[test]
    fn test_estimate_json() {
        let out = run("json", &Overrides::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["per_cohort"].as_array().unwrap().len(), 2);
        assert_eq!(value["deadline_days"], 30.0);
        // 35 VMs at 2 agents * 5 concurrent * 8h / 2h = 40 VMs/day
        let schedule = value["totals"]["schedule_days"].as_f64().unwrap();
        assert!((schedule - 35.0 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_what_if_with_more_agents() {
        let overrides = Overrides {
            bandwidth_mbps: None,
            agents: Some(4),
        };
        let out = run("json", &overrides).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let delta = value["schedule_days_delta"].as_f64().unwrap();
        assert!((delta - (35.0 / 80.0 - 35.0 / 40.0)).abs() < 1e-9);
        assert!(value["bandwidth_days_delta"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_estimate_text_with_what_if() {
        let overrides = Overrides {
            bandwidth_mbps: Some(2000.0),
            agents: None,
        };
        let out = run("text", &overrides).unwrap();
        assert!(out.contains("Timing Estimate"));
        assert!(out.contains("WHAT-IF"));
    }

    #[test]
    fn test_estimate_rejects_zero_bandwidth_scenario() {
        let overrides = Overrides {
            bandwidth_mbps: Some(0.0),
            agents: None,
        };
        assert!(run("json", &overrides).is_err());
    }

    #[test]
    fn test_apply_keeps_pinned_throughput() {
        let baseline = TimingParams {
            bandwidth_mbps: 1000.0,
            agent_slots: 2,
            working_hours_per_day: 8.0,
            effective_vms_per_day: 25.0,
            deadline_days: None,
        };
        let overrides = Overrides {
            bandwidth_mbps: None,
            agents: Some(6),
        };
        let scenario = overrides.apply(&baseline, Some(25.0), 5);
        assert_eq!(scenario.agent_slots, 6);
        assert_eq!(scenario.effective_vms_per_day, 25.0);

        let scenario = overrides.apply(&baseline, None, 5);
        assert_eq!(scenario.effective_vms_per_day, 120.0);
    }
}
