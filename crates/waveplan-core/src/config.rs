//! waveplan.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::policy::{
    CohortLayout, CohortProfile, EaseWeights, Guardrails, PackStrategy, PackStrategyKind,
    WaveStrategy,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub ease: EaseWeights,
    #[serde(default)]
    pub guardrails: Guardrails,
    #[serde(default)]
    pub cohorts: CohortConfig,
    #[serde(default)]
    pub waves: WaveConfig,
}

/// Project-level throughput inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub working_hours_per_day: f64,
    /// Deadline in calendar days.
    pub migration_duration_days: Option<f64>,
    pub agent_count: u32,
    pub agent_concurrent_vms: u32,
    /// Overrides the derived VMs/day when set.
    pub target_vms_per_day: Option<f64>,
    pub bandwidth_mbps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub strategy: PackStrategyKind,
    /// Strategy-level `riskiest_last` cutoff. Independent of the guardrail entry.
    pub risk_threshold: Option<f64>,
    pub count: Option<usize>,
    pub profiles: Option<Vec<CohortProfile>>,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            strategy: PackStrategyKind::EasiestFirst,
            risk_threshold: None,
            count: Some(3),
            profiles: None,
        }
    }
}

impl CohortConfig {
    pub fn strategy(&self) -> PackStrategy {
        self.strategy.with_threshold(self.risk_threshold)
    }

    /// Named profiles win over a uniform count.
    pub fn layout(&self) -> ConfigResult<CohortLayout> {
        let layout = match (&self.profiles, self.count) {
            (Some(profiles), _) => CohortLayout::Profiles(profiles.clone()),
            (None, Some(count)) => CohortLayout::Uniform { count },
            (None, None) => return Err(ConfigError::EmptyLayout),
        };
        layout.validate()?;
        Ok(layout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub strategy: WaveStrategy,
    pub max_vms_per_wave: usize,
    pub pilot_vm_count: usize,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            strategy: WaveStrategy::PilotFirst,
            max_vms_per_wave: 50,
            pilot_vm_count: 5,
        }
    }
}

impl PlanConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlanConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every policy record before any algorithm runs.
    pub fn validate(&self) -> ConfigResult<()> {
        self.ease.validate()?;
        self.guardrails.validate()?;
        self.cohorts.layout()?;
        if let Some(rt) = self.cohorts.risk_threshold {
            if !rt.is_finite() || rt < 0.0 {
                return Err(ConfigError::InvalidGuardrail {
                    field: "risk_threshold",
                    value: rt,
                });
            }
        }

        let p = &self.project;
        let positive = [
            ("bandwidth_mbps", p.bandwidth_mbps),
            ("working_hours_per_day", p.working_hours_per_day),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTiming { field, value });
            }
        }
        let optional = [
            ("migration_duration_days", p.migration_duration_days),
            ("target_vms_per_day", p.target_vms_per_day),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidTiming { field, value });
                }
            }
        }
        Ok(())
    }

    /// Scaffold a minimal waveplan.toml.
    pub fn scaffold(name: &str) -> Self {
        PlanConfig {
            project: ProjectConfig {
                name: name.to_string(),
                working_hours_per_day: 8.0,
                migration_duration_days: Some(90.0),
                agent_count: 2,
                agent_concurrent_vms: 5,
                target_vms_per_day: None,
                bandwidth_mbps: 1000.0,
            },
            ease: EaseWeights::default(),
            guardrails: Guardrails {
                max_vms_per_cohort: Some(400),
                max_disk_tb_per_cohort: Some(50.0),
                max_avg_risk_pct: Some(70.0),
                min_os_support_pct: Some(60.0),
                pilot_size: Some(5),
                riskiest_last_threshold: None,
            },
            cohorts: CohortConfig::default(),
            waves: WaveConfig::default(),
        }
    }
}
