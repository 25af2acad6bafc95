use anyhow::Context;
use vald_config::ValdConfig;

use crate::cli::GlobalFlags;

/// Load configuration, layering `--config` when given.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ValdConfig> {
    match &flags.config {
        Some(path) => ValdConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => ValdConfig::load_with_dotenv().context("failed to load configuration"),
    }
}
