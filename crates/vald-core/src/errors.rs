//! Cross-cutting error types.
//!
//! Domain-specific errors (`ApiError`, `SinkError`, ...) live in their own
//! crates. Errors converge into `anyhow` in `vald-cli`.

use thiserror::Error;

/// Errors that can be raised by any VALD crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A timestamp string could not be parsed.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A table operation referenced a column that does not exist.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}
