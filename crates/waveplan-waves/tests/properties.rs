//! Wave builder properties across every strategy.

use std::collections::HashSet;

use waveplan_core::{RiskCategory, VmRecord, WaveStrategy};
use waveplan_waves::{WaveBuild, WaveOptions, WaveType, build_waves};

const STRATEGIES: [WaveStrategy; 5] = [
    WaveStrategy::PilotFirst,
    WaveStrategy::ByTenant,
    WaveStrategy::ByRisk,
    WaveStrategy::ByPriority,
    WaveStrategy::Balanced,
];

fn sample_vms(n: usize) -> Vec<VmRecord> {
    (0..n)
        .map(|i| {
            let risk = match i % 7 {
                0 | 3 => RiskCategory::Red,
                1 | 4 | 6 => RiskCategory::Yellow,
                _ => RiskCategory::Green,
            };
            VmRecord {
                in_use_gb: if i % 11 == 0 { None } else { Some(((i * 97) % 800) as f64) },
                tenant_priority: if i % 4 == 0 { None } else { Some((i % 5) as u32) },
                cohort: Some(format!("c{}", i % 3)),
                ..VmRecord::new(&format!("vm-{i:04}"), &format!("tenant-{}", i % 9), risk)
            }
        })
        .collect()
}

fn options(strategy: WaveStrategy, cap: usize) -> WaveOptions {
    WaveOptions {
        strategy,
        max_vms_per_wave: cap,
        pilot_vm_count: 5,
        cohort_id: None,
    }
}

fn placed(build: &WaveBuild) -> Vec<&str> {
    build
        .waves
        .iter()
        .flat_map(|w| w.vm_names.iter().map(String::as_str))
        .collect()
}

#[test]
fn every_vm_lands_in_exactly_one_wave() {
    let vms = sample_vms(120);
    for strategy in STRATEGIES {
        for cap in [1, 7, 50, 500] {
            let build = build_waves(&vms, &options(strategy, cap));
            let names = placed(&build);
            let unique: HashSet<&str> = names.iter().copied().collect();
            assert_eq!(names.len(), vms.len(), "{strategy} cap {cap}");
            assert_eq!(unique.len(), vms.len(), "{strategy} cap {cap}: duplicate placement");
            assert!(build.unassigned_vm_ids.is_empty());
        }
    }
}

#[test]
fn waves_respect_cap_and_are_numbered() {
    let vms = sample_vms(90);
    for strategy in STRATEGIES {
        let build = build_waves(&vms, &options(strategy, 8));
        for (i, wave) in build.waves.iter().enumerate() {
            assert_eq!(wave.index, i);
            assert!(wave.vm_count > 0);
            assert_eq!(wave.vm_count, wave.vm_names.len());
            assert_eq!(wave.green_count + wave.yellow_count + wave.red_count, wave.vm_count);
            if wave.wave_type != WaveType::Pilot {
                assert!(wave.vm_count <= 8, "{strategy}: {} has {}", wave.name, wave.vm_count);
            }
            if wave.wave_type == WaveType::Cleanup {
                assert_eq!(wave.red_count, wave.vm_count);
            }
        }
    }
}

#[test]
fn only_pilot_first_builds_a_pilot() {
    let vms = sample_vms(40);
    for strategy in STRATEGIES {
        let build = build_waves(&vms, &options(strategy, 10));
        let pilots = build.waves.iter().filter(|w| w.wave_type == WaveType::Pilot).count();
        let expected = usize::from(strategy == WaveStrategy::PilotFirst);
        assert_eq!(pilots, expected, "{strategy}");
    }
}

#[test]
fn builds_are_deterministic() {
    let vms = sample_vms(75);
    for strategy in STRATEGIES {
        let a = build_waves(&vms, &options(strategy, 6));
        let b = build_waves(&vms, &options(strategy, 6));
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }
}

#[test]
fn pilot_holds_only_the_three_qualifying_vms() {
    let mut vms: Vec<VmRecord> = (0..50)
        .map(|i| VmRecord {
            in_use_gb: Some(f64::from(i)),
            ..VmRecord::new(&format!("vm-{i}"), "acme", RiskCategory::Yellow)
        })
        .collect();
    for i in [10, 20, 30] {
        vms[i].risk_category = RiskCategory::Green;
    }

    let build = build_waves(&vms, &options(WaveStrategy::PilotFirst, 50));
    let pilot = &build.waves[0];
    assert_eq!(pilot.wave_type, WaveType::Pilot);
    assert_eq!(pilot.vm_names, vec!["vm-10", "vm-20", "vm-30"]);
    assert_eq!(build.vm_count(), 50);
    assert_eq!(build.waves[1].vm_count, 47);
    assert_eq!(build.warnings.len(), 1);
}

#[test]
fn cohort_scope_partitions_the_input() {
    let vms = sample_vms(60);
    let mut total = 0;
    for cohort in ["c0", "c1", "c2"] {
        let opts = WaveOptions {
            cohort_id: Some(cohort.to_string()),
            ..options(WaveStrategy::Balanced, 9)
        };
        let build = build_waves(&vms, &opts);
        assert!(build.waves.iter().all(|w| w.cohort_id.as_deref() == Some(cohort)));
        total += build.vm_count();
    }
    assert_eq!(total, 60);
}

#[test]
fn balanced_uses_minimum_wave_count() {
    let vms = sample_vms(101);
    let build = build_waves(&vms, &options(WaveStrategy::Balanced, 10));
    assert_eq!(build.waves.len(), 11);
}
