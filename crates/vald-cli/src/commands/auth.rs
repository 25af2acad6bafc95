use serde::Serialize;
use vald_pipeline::Orchestrator;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthCheckResponse {
    authenticated: bool,
    token_url: String,
}

pub async fn check(flags: &GlobalFlags, config: vald_config::ValdConfig) -> anyhow::Result<()> {
    if !config.api.is_configured() {
        anyhow::bail!("auth check: VALD_API__CLIENT_ID and VALD_API__CLIENT_SECRET are not configured");
    }

    let token_url = config.api.token_url.clone();
    Orchestrator::new(config).authenticate().await?;

    output(
        &AuthCheckResponse {
            authenticated: true,
            token_url: token_url.clone(),
        },
        &format!("authenticated against {token_url}"),
        flags.format,
    )
}
