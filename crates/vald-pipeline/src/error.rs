//! Run-aborting failures.

use thiserror::Error;

/// The only ways a run stops early. Every other failure is logged and the
/// run continues with whatever data it has.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] vald_auth::AuthError),

    #[error("no tenants available for these credentials")]
    NoTenants,

    #[error(transparent)]
    Config(#[from] vald_config::ConfigError),
}
