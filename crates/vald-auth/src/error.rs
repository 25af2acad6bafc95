use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication failed ({status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    #[error("authentication request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token response did not contain an access token")]
    MissingToken,

    #[error("client credentials are not configured")]
    NotConfigured,

    #[error("invalid service account key: {0}")]
    InvalidKey(String),

    #[error("failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
