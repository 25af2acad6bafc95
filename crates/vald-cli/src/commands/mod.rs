pub mod auth;
pub mod run;
pub mod tenants;

use vald_config::ValdConfig;

use crate::cli::{AuthCommands, Commands, GlobalFlags};

pub async fn dispatch(
    command: Commands,
    flags: &GlobalFlags,
    config: ValdConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run::handle(&args, flags, config).await,
        Commands::Tenants => tenants::handle(flags, config).await,
        Commands::Auth {
            action: AuthCommands::Check,
        } => auth::check(flags, config).await,
    }
}
