//! Inventory types shared across waveplan crates.
//!
//! These mirror the tenant and VM records supplied by the inventory
//! backend. They are read-only inputs: nothing in the workspace mutates
//! them, and every derived value (ease scores, cohorts, waves, timings)
//! is recomputed from a fresh snapshot on each call.

use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for a tenant.
pub type TenantId = String;

/// Reads an optional numeric input as a signal, treating missing, NaN,
/// infinite and negative values as "no signal" (zero).
pub fn signal(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Like [`signal`], but clamped into `[0, 1]` for ratio inputs.
pub fn ratio_signal(value: Option<f64>) -> f64 {
    signal(value).min(1.0)
}

/// Any JSON value a numeric inventory field may carry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Float(f64),
    Other(serde::de::IgnoredAny),
}

impl RawNumber {
    /// Non-negative whole numbers that fit in a `u32`; anything else is `None`.
    fn whole(self) -> Option<u32> {
        match self {
            RawNumber::Int(n) => u32::try_from(n).ok(),
            RawNumber::Float(f)
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) =>
            {
                Some(f as u32)
            }
            _ => None,
        }
    }

    fn real(self) -> Option<f64> {
        match self {
            RawNumber::Int(n) => Some(n as f64),
            RawNumber::Float(f) => Some(f),
            RawNumber::Other(_) => None,
        }
    }
}

// Inventory exports are loose: `null`, `2.0` for a count, or a stray
// string must read as "no signal" rather than fail the whole snapshot.

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(RawNumber::deserialize(d)?.whole().unwrap_or(0))
}

fn lenient_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(RawNumber::deserialize(d)?.whole())
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(RawNumber::deserialize(d)?.real())
}

// ── Tenant ─────────────────────────────────────────────────────────

/// Resource footprint and risk inputs for one tenant.
///
/// Risk inputs are optional because partial inventory is the common case.
/// `null` and absent fields both deserialize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TenantFootprint {
    pub id: TenantId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub vm_count: u32,
    #[serde(default, deserialize_with = "lenient_opt_f64", alias = "total_used_gb")]
    pub total_used_disk_gb: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub total_vcpu: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub total_ram_gb: Option<f64>,
    /// Backend risk score, 0–100.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub avg_risk_score: Option<f64>,
    /// Share of VMs on a supported OS, 0–1.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub os_support_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_u32", alias = "distinct_network_count")]
    pub network_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32", alias = "cross_tenant_dependency_count")]
    pub cross_tenant_dep_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub cold_vm_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64", alias = "unconfirmed_mapping_ratio")]
    pub unconfirmed_ratio: Option<f64>,
    /// Lower runs earlier.
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub migration_priority: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub linux_vm_count: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub windows_vm_count: u32,
}

impl TenantFootprint {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn used_disk_gb(&self) -> f64 {
        signal(self.total_used_disk_gb)
    }

    /// Risk score clamped to 0–100.
    pub fn risk_score(&self) -> f64 {
        signal(self.avg_risk_score).min(100.0)
    }

    /// Risk score, or `None` when the backend sent nothing usable.
    pub fn risk_sample(&self) -> Option<f64> {
        self.avg_risk_score
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.min(100.0))
    }

    /// OS support as a percentage, or `None` when the backend sent nothing
    /// usable. Negative rates are no signal.
    pub fn os_support_pct(&self) -> Option<f64> {
        self.os_support_rate
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.min(1.0) * 100.0)
    }

    /// Majority OS family. Ties and empty counts are not Linux-dominant.
    pub fn dominant_os(&self) -> OsFamily {
        if self.linux_vm_count > self.windows_vm_count {
            OsFamily::Linux
        } else {
            OsFamily::Windows
        }
    }
}

/// Dominant guest OS family of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Linux,
    Windows,
}

/// A tenant paired with its precomputed ease score (lower = easier).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTenant {
    pub footprint: TenantFootprint,
    pub ease_score: f64,
}

impl ScoredTenant {
    pub fn new(footprint: TenantFootprint, ease_score: f64) -> Self {
        Self {
            footprint,
            ease_score: if ease_score.is_finite() { ease_score } else { 0.0 },
        }
    }

    pub fn id(&self) -> &str {
        &self.footprint.id
    }
}

// ── VM ─────────────────────────────────────────────────────────────

/// Backend risk bucket for a single VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Green,
    Yellow,
    Red,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Green => "GREEN",
            RiskCategory::Yellow => "YELLOW",
            RiskCategory::Red => "RED",
        }
    }
}

/// How a VM is moved: replicated while running, or copied powered-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationMode {
    Warm,
    Cold,
}

/// One VM from the inventory. `vm_name` is its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VmRecord {
    pub vm_name: String,
    pub tenant_name: String,
    pub risk_category: RiskCategory,
    #[serde(default)]
    pub migration_mode: Option<MigrationMode>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub in_use_gb: Option<f64>,
    /// Owning tenant's migration priority, denormalized for wave ordering.
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub tenant_priority: Option<u32>,
    /// Cohort the owning tenant is assigned to, if any.
    #[serde(default)]
    pub cohort: Option<String>,
}

impl VmRecord {
    pub fn new(vm_name: &str, tenant_name: &str, risk_category: RiskCategory) -> Self {
        Self {
            vm_name: vm_name.to_string(),
            tenant_name: tenant_name.to_string(),
            risk_category,
            migration_mode: None,
            in_use_gb: None,
            tenant_priority: None,
            cohort: None,
        }
    }

    pub fn disk_gb(&self) -> f64 {
        signal(self.in_use_gb)
    }
}

/// An inventory snapshot as exported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub tenants: Vec<TenantFootprint>,
    #[serde(default)]
    pub vms: Vec<VmRecord>,
}

impl Inventory {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
