use vald_pipeline::Orchestrator;

use crate::cli::GlobalFlags;
use crate::output::{output, render_rows};

pub async fn handle(flags: &GlobalFlags, config: vald_config::ValdConfig) -> anyhow::Result<()> {
    config.validate()?;
    let tenants = Orchestrator::new(config).tenants().await?;
    if tenants.is_empty() {
        tracing::warn!("no tenants visible to these credentials");
    }

    let rows: Vec<Vec<String>> = tenants
        .iter()
        .map(|t| vec![t.id.clone(), t.name.clone()])
        .collect();
    output(&tenants, &render_rows(&["id", "name"], &rows), flags.format)
}
