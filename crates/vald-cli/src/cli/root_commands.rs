use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Root-level commands for the `valdx` CLI.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Extract tenants, profiles and device tests, then write CSV files and sheets.
    Run(RunArgs),
    /// List the tenants the configured credentials can see.
    Tenants,
    /// Credential checks.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
}

#[derive(Clone, Debug, Default, Args)]
pub struct RunArgs {
    /// Starting watermark, e.g. 2024-01-01T00:00:00.000Z
    #[arg(long)]
    pub since: Option<String>,
    /// Directory CSV files are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Only keep groups of this category
    #[arg(long)]
    pub category: Option<String>,
    /// Restrict test extraction to one profile
    #[arg(long)]
    pub profile: Option<String>,
    /// Skip the Google Sheets upload even when configured
    #[arg(long)]
    pub no_sheets: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Request a token with the configured client credentials.
    Check,
}
