//! Sink error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The spreadsheet API answered with a non-success status.
    #[error("spreadsheet API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("spreadsheet authentication failed: {0}")]
    Auth(#[from] vald_auth::AuthError),

    #[error("spreadsheet credentials unavailable: {0}")]
    Credentials(String),

    #[error("spreadsheet sink not configured: {0}")]
    NotConfigured(&'static str),

    #[error("unexpected spreadsheet API response: {0}")]
    Parse(String),
}
