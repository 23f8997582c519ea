//! Policy records: ease weights, guardrails, cohort layouts, strategies.
//!
//! These are the knobs a planner edits between runs. Every record is an
//! explicit value passed into the algorithms; there is no ambient state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default `riskiest_last` cutoff when neither the strategy nor the
/// guardrails set one.
pub const DEFAULT_RISKIEST_LAST_THRESHOLD: f64 = 70.0;

/// Default pilot cohort size for `pilot_bulk`.
pub const DEFAULT_PILOT_SIZE: usize = 5;

// ── Ease weights ───────────────────────────────────────────────────

/// The fixed dimensions of the ease score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseDimension {
    Disk,
    Risk,
    Os,
    VmCount,
    Networks,
    Deps,
    Cold,
    Unconf,
}

impl EaseDimension {
    pub const ALL: [EaseDimension; 8] = [
        EaseDimension::Disk,
        EaseDimension::Risk,
        EaseDimension::Os,
        EaseDimension::VmCount,
        EaseDimension::Networks,
        EaseDimension::Deps,
        EaseDimension::Cold,
        EaseDimension::Unconf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EaseDimension::Disk => "disk",
            EaseDimension::Risk => "risk",
            EaseDimension::Os => "os",
            EaseDimension::VmCount => "vm_count",
            EaseDimension::Networks => "networks",
            EaseDimension::Deps => "deps",
            EaseDimension::Cold => "cold",
            EaseDimension::Unconf => "unconf",
        }
    }
}

impl fmt::Display for EaseDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum points per ease dimension. Defaults sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaseWeights {
    pub disk: f64,
    pub risk: f64,
    pub os: f64,
    pub vm_count: f64,
    pub networks: f64,
    pub deps: f64,
    pub cold: f64,
    pub unconf: f64,
}

impl Default for EaseWeights {
    fn default() -> Self {
        Self {
            disk: 20.0,
            risk: 25.0,
            os: 15.0,
            vm_count: 10.0,
            networks: 10.0,
            deps: 10.0,
            cold: 5.0,
            unconf: 5.0,
        }
    }
}

impl EaseWeights {
    pub fn get(&self, dimension: EaseDimension) -> f64 {
        match dimension {
            EaseDimension::Disk => self.disk,
            EaseDimension::Risk => self.risk,
            EaseDimension::Os => self.os,
            EaseDimension::VmCount => self.vm_count,
            EaseDimension::Networks => self.networks,
            EaseDimension::Deps => self.deps,
            EaseDimension::Cold => self.cold,
            EaseDimension::Unconf => self.unconf,
        }
    }

    /// Upper bound of any ease score computed with these weights.
    pub fn total(&self) -> f64 {
        EaseDimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for dimension in EaseDimension::ALL {
            let value = self.get(dimension);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    dimension: dimension.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }
}

// ── Guardrails ─────────────────────────────────────────────────────

/// Per-cohort caps. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guardrails {
    pub max_vms_per_cohort: Option<u32>,
    pub max_disk_tb_per_cohort: Option<f64>,
    /// Cap on the cohort's mean tenant risk score (0–100).
    pub max_avg_risk_pct: Option<f64>,
    /// Floor on the cohort's mean OS support (0–100).
    pub min_os_support_pct: Option<f64>,
    pub pilot_size: Option<usize>,
    pub riskiest_last_threshold: Option<f64>,
}

impl Guardrails {
    /// Guardrails with every cap unlimited.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Disk cap converted to GB.
    pub fn max_disk_gb(&self) -> Option<f64> {
        self.max_disk_tb_per_cohort.map(|tb| tb * 1024.0)
    }

    pub fn pilot_size(&self) -> usize {
        self.pilot_size.unwrap_or(DEFAULT_PILOT_SIZE)
    }

    /// Resolves the `riskiest_last` cutoff: the strategy's own value wins,
    /// then the guardrail entry, then the default.
    pub fn risk_threshold(&self, strategy_value: Option<f64>) -> f64 {
        strategy_value
            .or(self.riskiest_last_threshold)
            .unwrap_or(DEFAULT_RISKIEST_LAST_THRESHOLD)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let checks = [
            ("max_disk_tb_per_cohort", self.max_disk_tb_per_cohort),
            ("max_avg_risk_pct", self.max_avg_risk_pct),
            ("min_os_support_pct", self.min_os_support_pct),
            ("riskiest_last_threshold", self.riskiest_last_threshold),
        ];
        for (field, value) in checks {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidGuardrail { field, value });
                }
            }
        }
        Ok(())
    }
}

// ── Cohort layout ──────────────────────────────────────────────────

/// A named cohort with an optional VM cap. Unlimited only on the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortProfile {
    pub name: String,
    #[serde(default)]
    pub max_vms: Option<u32>,
}

impl CohortProfile {
    pub fn capped(name: &str, max_vms: u32) -> Self {
        Self {
            name: name.to_string(),
            max_vms: Some(max_vms),
        }
    }

    pub fn unlimited(name: &str) -> Self {
        Self {
            name: name.to_string(),
            max_vms: None,
        }
    }
}

/// How many cohorts to build and what they are called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortLayout {
    /// `count` cohorts named "Cohort 1".."Cohort N"; the last is the sink.
    Uniform { count: usize },
    /// Named cohorts in order; the last must be unlimited.
    Profiles(Vec<CohortProfile>),
}

impl CohortLayout {
    pub fn len(&self) -> usize {
        match self {
            CohortLayout::Uniform { count } => *count,
            CohortLayout::Profiles(profiles) => profiles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the layout into concrete profiles.
    pub fn profiles(&self) -> Vec<CohortProfile> {
        match self {
            CohortLayout::Uniform { count } => (0..*count)
                .map(|i| CohortProfile::unlimited(&format!("Cohort {}", i + 1)))
                .collect(),
            CohortLayout::Profiles(profiles) => profiles.clone(),
        }
    }

    /// Checks the overflow-sink rule: non-empty, only the last entry is
    /// unlimited, and the last entry is unlimited.
    pub fn validate(&self) -> ConfigResult<()> {
        let profiles = match self {
            CohortLayout::Uniform { count } => {
                return if *count == 0 {
                    Err(ConfigError::EmptyLayout)
                } else {
                    Ok(())
                };
            }
            CohortLayout::Profiles(profiles) => profiles,
        };

        let Some((last, rest)) = profiles.split_last() else {
            return Err(ConfigError::EmptyLayout);
        };
        if let Some(index) = rest.iter().position(|p| p.max_vms.is_none()) {
            return Err(ConfigError::UnlimitedBeforeLast {
                index,
                name: rest[index].name.clone(),
            });
        }
        if last.max_vms.is_some() {
            return Err(ConfigError::NoOverflowSink(last.name.clone()));
        }
        Ok(())
    }
}

// ── Strategies ─────────────────────────────────────────────────────

/// Tenant ordering used by the cohort packer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackStrategy {
    EasiestFirst,
    /// Tenants at or above the threshold go to the last cohort.
    RiskiestLast { risk_threshold: Option<f64> },
    PilotBulk,
    BalancedLoad,
    OsFirst,
    ByPriority,
}

impl PackStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PackStrategy::EasiestFirst => "easiest_first",
            PackStrategy::RiskiestLast { .. } => "riskiest_last",
            PackStrategy::PilotBulk => "pilot_bulk",
            PackStrategy::BalancedLoad => "balanced_load",
            PackStrategy::OsFirst => "os_first",
            PackStrategy::ByPriority => "by_priority",
        }
    }
}

impl FromStr for PackStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<PackStrategyKind>()?.with_threshold(None))
    }
}

/// Strategy name as written in `waveplan.toml`. The `riskiest_last`
/// threshold lives next to it and is attached by
/// [`PackStrategyKind::with_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackStrategyKind {
    #[default]
    EasiestFirst,
    RiskiestLast,
    PilotBulk,
    BalancedLoad,
    OsFirst,
    ByPriority,
}

impl PackStrategyKind {
    pub fn with_threshold(self, risk_threshold: Option<f64>) -> PackStrategy {
        match self {
            PackStrategyKind::EasiestFirst => PackStrategy::EasiestFirst,
            PackStrategyKind::RiskiestLast => PackStrategy::RiskiestLast { risk_threshold },
            PackStrategyKind::PilotBulk => PackStrategy::PilotBulk,
            PackStrategyKind::BalancedLoad => PackStrategy::BalancedLoad,
            PackStrategyKind::OsFirst => PackStrategy::OsFirst,
            PackStrategyKind::ByPriority => PackStrategy::ByPriority,
        }
    }
}

impl FromStr for PackStrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easiest_first" => Ok(PackStrategyKind::EasiestFirst),
            "riskiest_last" => Ok(PackStrategyKind::RiskiestLast),
            "pilot_bulk" => Ok(PackStrategyKind::PilotBulk),
            "balanced_load" => Ok(PackStrategyKind::BalancedLoad),
            "os_first" => Ok(PackStrategyKind::OsFirst),
            "by_priority" => Ok(PackStrategyKind::ByPriority),
            other => Err(ConfigError::UnknownStrategy {
                kind: "cohort",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// VM ordering used by the wave builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStrategy {
    #[default]
    PilotFirst,
    ByTenant,
    ByRisk,
    ByPriority,
    Balanced,
}

impl WaveStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            WaveStrategy::PilotFirst => "pilot_first",
            WaveStrategy::ByTenant => "by_tenant",
            WaveStrategy::ByRisk => "by_risk",
            WaveStrategy::ByPriority => "by_priority",
            WaveStrategy::Balanced => "balanced",
        }
    }
}

impl FromStr for WaveStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pilot_first" => Ok(WaveStrategy::PilotFirst),
            "by_tenant" => Ok(WaveStrategy::ByTenant),
            "by_risk" => Ok(WaveStrategy::ByRisk),
            "by_priority" => Ok(WaveStrategy::ByPriority),
            "balanced" => Ok(WaveStrategy::Balanced),
            other => Err(ConfigError::UnknownStrategy {
                kind: "wave",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for WaveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_100() {
        let w = EaseWeights::default();
        assert!((w.total() - 100.0).abs() < 1e-9);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn rejects_negative_weight() {
        let w = EaseWeights {
            cold: -1.0,
            ..Default::default()
        };
        assert_eq!(
            w.validate(),
            Err(ConfigError::InvalidWeight {
                dimension: "cold",
                value: -1.0
            })
        );
    }

    #[test]
    fn profiles_require_unlimited_sink() {
        let layout = CohortLayout::Profiles(vec![
            CohortProfile::capped("Pilot", 20),
            CohortProfile::capped("Wave A", 200),
        ]);
        assert_eq!(
            layout.validate(),
            Err(ConfigError::NoOverflowSink("Wave A".to_string()))
        );
    }

    #[test]
    fn profiles_reject_unlimited_before_last() {
        let layout = CohortLayout::Profiles(vec![
            CohortProfile::unlimited("Pilot"),
            CohortProfile::unlimited("Rest"),
        ]);
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::UnlimitedBeforeLast { index: 0, .. })
        ));
    }

    #[test]
    fn empty_layouts_rejected() {
        assert_eq!(
            CohortLayout::Uniform { count: 0 }.validate(),
            Err(ConfigError::EmptyLayout)
        );
        assert_eq!(
            CohortLayout::Profiles(Vec::new()).validate(),
            Err(ConfigError::EmptyLayout)
        );
    }

    #[test]
    fn uniform_layout_names_cohorts() {
        let profiles = CohortLayout::Uniform { count: 3 }.profiles();
        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cohort 1", "Cohort 2", "Cohort 3"]);
    }

    #[test]
    fn risk_threshold_resolution_order() {
        let mut g = Guardrails::unlimited();
        assert_eq!(g.risk_threshold(None), DEFAULT_RISKIEST_LAST_THRESHOLD);
        g.riskiest_last_threshold = Some(80.0);
        assert_eq!(g.risk_threshold(None), 80.0);
        assert_eq!(g.risk_threshold(Some(60.0)), 60.0);
    }

    #[test]
    fn guardrails_reject_nan() {
        let g = Guardrails {
            max_avg_risk_pct: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            g.validate(),
            Err(ConfigError::InvalidGuardrail { field: "max_avg_risk_pct", .. })
        ));
    }

    #[test]
    fn strategy_names_parse() {
        for name in [
            "easiest_first",
            "riskiest_last",
            "pilot_bulk",
            "balanced_load",
            "os_first",
            "by_priority",
        ] {
            let s: PackStrategy = name.parse().unwrap();
            assert_eq!(s.name(), name);
        }
        assert!("random".parse::<PackStrategy>().is_err());
        assert_eq!(
            PackStrategyKind::RiskiestLast.with_threshold(Some(50.0)),
            PackStrategy::RiskiestLast {
                risk_threshold: Some(50.0)
            }
        );
        assert_eq!("balanced".parse::<WaveStrategy>().unwrap(), WaveStrategy::Balanced);
    }
}
