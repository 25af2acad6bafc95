//! Client-credentials grant against the VALD security service.

use vald_config::ApiConfig;

use crate::{AuthError, exchange};

/// Fetches the bearer token for VALD API calls.
pub struct TokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl TokenProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Exchange the client credentials for a bearer token.
    ///
    /// Any non-200 status, transport failure, or response without an
    /// `access_token` is an authentication failure. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] without making a request when the
    /// credentials are blank, otherwise the [`AuthError`] describing why the
    /// exchange failed.
    pub async fn fetch_token(&self) -> Result<String, AuthError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AuthError::NotConfigured);
        }

        let result = exchange(
            &self.http,
            &self.token_url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ],
        )
        .await;

        match &result {
            Ok(_) => tracing::debug!(url = %self.token_url, "authenticated"),
            Err(e) => tracing::error!(url = %self.token_url, %e, "authentication failed"),
        }
        result
    }
}
