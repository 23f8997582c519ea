//! Wave records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use waveplan_core::{RiskCategory, VmRecord, WaveConfig, WaveStrategy};

/// Parameters for one wave build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveOptions {
    pub strategy: WaveStrategy,
    pub max_vms_per_wave: usize,
    pub pilot_vm_count: usize,
    /// Only VMs tagged with this cohort are considered.
    pub cohort_id: Option<String>,
}

impl WaveOptions {
    pub fn from_config(config: &WaveConfig, cohort_id: Option<String>) -> Self {
        Self {
            strategy: config.strategy,
            max_vms_per_wave: config.max_vms_per_wave,
            pilot_vm_count: config.pilot_vm_count,
            cohort_id,
        }
    }
}

impl Default for WaveOptions {
    fn default() -> Self {
        Self::from_config(&WaveConfig::default(), None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveType {
    Pilot,
    Regular,
    /// Every VM in the wave is RED.
    Cleanup,
}

impl WaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaveType::Pilot => "pilot",
            WaveType::Regular => "regular",
            WaveType::Cleanup => "cleanup",
        }
    }
}

/// One proposed wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePreview {
    pub index: usize,
    pub name: String,
    pub wave_type: WaveType,
    pub cohort_id: Option<String>,
    pub vm_names: Vec<String>,
    pub vm_count: usize,
    pub total_disk_gb: f64,
    /// Distinct tenants in order of first appearance.
    pub tenant_names: Vec<String>,
    pub green_count: usize,
    pub yellow_count: usize,
    pub red_count: usize,
}

impl WavePreview {
    /// Summarize `vms` as a wave. A wave is `Cleanup` when it is made only
    /// of RED VMs, unless it is the pilot.
    pub(crate) fn from_vms(
        index: usize,
        name: String,
        pilot: bool,
        cohort_id: Option<String>,
        vms: &[&VmRecord],
    ) -> Self {
        let mut tenant_names: Vec<String> = Vec::new();
        let (mut green_count, mut yellow_count, mut red_count) = (0, 0, 0);
        for vm in vms {
            match vm.risk_category {
                RiskCategory::Green => green_count += 1,
                RiskCategory::Yellow => yellow_count += 1,
                RiskCategory::Red => red_count += 1,
            }
            if !tenant_names.contains(&vm.tenant_name) {
                tenant_names.push(vm.tenant_name.clone());
            }
        }
        let wave_type = if pilot {
            WaveType::Pilot
        } else if !vms.is_empty() && red_count == vms.len() {
            WaveType::Cleanup
        } else {
            WaveType::Regular
        };
        Self {
            index,
            name,
            wave_type,
            cohort_id,
            vm_names: vms.iter().map(|vm| vm.vm_name.clone()).collect(),
            vm_count: vms.len(),
            total_disk_gb: vms.iter().map(|vm| vm.disk_gb()).sum(),
            tenant_names,
            green_count,
            yellow_count,
            red_count,
        }
    }
}

/// Result of [`build_waves`](crate::build_waves).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveBuild {
    pub waves: Vec<WavePreview>,
    pub warnings: Vec<String>,
    /// VMs that could not be placed in any wave.
    pub unassigned_vm_ids: Vec<String>,
}

impl WaveBuild {
    pub fn vm_count(&self) -> usize {
        self.waves.iter().map(|w| w.vm_count).sum()
    }

    /// Index of the wave holding `vm_name`.
    pub fn wave_of(&self, vm_name: &str) -> Option<usize> {
        self.waves
            .iter()
            .position(|w| w.vm_names.iter().any(|n| n == vm_name))
    }

    /// SHA-256 of the build's JSON form.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
