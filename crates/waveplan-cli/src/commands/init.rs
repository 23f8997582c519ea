use std::path::Path;

use anyhow::bail;
use waveplan_core::PlanConfig;

/// Write a scaffold `waveplan.toml` into `path`, named after the directory.
pub fn init(path: &str) -> anyhow::Result<()> {
    let output = write_scaffold(Path::new(path))?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

fn write_scaffold(dir: &Path) -> anyhow::Result<std::path::PathBuf> {
    let output = dir.join("waveplan.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "migration".to_string());
    std::fs::create_dir_all(dir)?;
    std::fs::write(&output, PlanConfig::scaffold(&name).to_toml_string()?)?;
    Ok(output)
}
