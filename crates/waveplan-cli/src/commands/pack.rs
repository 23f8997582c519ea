use crate::commands::{load, propose};
use crate::report;

/// Print ease scores and the cohort proposal.
pub fn pack(config: &str, inventory: &str, format: &str) -> anyhow::Result<()> {
    println!("{}", render(config, inventory, format)?);
    Ok(())
}

fn render(config: &str, inventory: &str, format: &str) -> anyhow::Result<String> {
    let loaded = load(config, inventory)?;
    let (_, plan) = propose(&loaded)?;
    let ranked = waveplan_ease::rank_tenants(&loaded.inventory.tenants, &loaded.config.ease);

    let fingerprint = plan.fingerprint()?;

    match format {
        "json" => {
            let scores: Vec<_> = loaded
                .inventory
                .tenants
                .iter()
                .map(|t| waveplan_ease::compute_ease_score(t, &loaded.config.ease))
                .zip(&loaded.inventory.tenants)
                .map(|(score, t)| serde_json::json!({ "tenant_id": t.id, "ease": score }))
                .collect();
            Ok(serde_json::to_string_pretty(&serde_json::json!({
                "project": loaded.config.project.name,
                "scores": scores,
                "plan": plan,
                "fingerprint": fingerprint,
            }))?)
        }
        _ => Ok(report::format_pack(&loaded.config.project.name, &ranked, &plan, &fingerprint)),
    }
}
