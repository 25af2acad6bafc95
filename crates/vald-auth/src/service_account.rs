//! Service-account access tokens for the spreadsheet API.
//!
//! The key's private key signs a short-lived RS256 JWT assertion, which the
//! key's `token_uri` exchanges for an OAuth access token (RFC 7523).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{AuthError, exchange};

/// Scopes needed to open a spreadsheet by id and rewrite its sheets.
pub const SHEETS_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    String::from("https://oauth2.googleapis.com/token")
}

/// The fields of a service-account key file this crate needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAccountKey {
    /// Parse a key from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] if the document is not JSON or lacks
    /// `client_email` / `private_key`.
    pub fn from_json(payload: &str) -> Result<Self, AuthError> {
        let key: Self =
            serde_json::from_str(payload).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(AuthError::InvalidKey(
                "client_email and private_key are required".into(),
            ));
        }
        Ok(key)
    }

    /// Point the token exchange somewhere else (mock servers).
    #[must_use]
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Claims for an assertion issued at `now`.
    #[must_use]
    pub fn claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: SHEETS_SCOPES.join(" "),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }

    /// Sign an assertion issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if the private key is not a valid RSA PEM.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);
        Ok(jsonwebtoken::encode(&header, &self.claims(now), &encoding_key)?)
    }

    /// Exchange a freshly signed assertion for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if signing fails, the token endpoint is
    /// unreachable, or it answers with anything but a token.
    pub async fn fetch_access_token(&self, http: &reqwest::Client) -> Result<String, AuthError> {
        let assertion = self.assertion(Utc::now())?;
        let token = exchange(
            http,
            &self.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)],
        )
        .await?;
        tracing::debug!(client_email = %self.client_email, "obtained spreadsheet access token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_non_json_payload() {
        assert!(matches!(
            ServiceAccountKey::from_json("not json"),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn rejects_key_without_private_key() {
        let payload = r#"{"client_email": "a@b.c", "private_key": ""}"#;
        assert!(matches!(
            ServiceAccountKey::from_json(payload),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn token_uri_defaults_when_absent() {
        let payload = r#"{"client_email": "a@b.c", "private_key": "pem"}"#;
        let key = ServiceAccountKey::from_json(payload).unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn claims_cover_sheets_scopes_for_one_hour() {
        let payload = r#"{"client_email": "a@b.c", "private_key": "pem", "token_uri": "https://t/x"}"#;
        let key = ServiceAccountKey::from_json(payload).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let claims = key.claims(now);

        assert_eq!(claims.iss, "a@b.c");
        assert_eq!(claims.aud, "https://t/x");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.scope.contains("auth/spreadsheets"));
        assert!(claims.scope.contains("auth/drive"));
    }

    #[test]
    fn garbage_private_key_fails_to_sign() {
        let payload = r#"{"client_email": "a@b.c", "private_key": "not a pem"}"#;
        let key = ServiceAccountKey::from_json(payload).unwrap();
        assert!(matches!(key.assertion(Utc::now()), Err(AuthError::Signing(_))));
    }
}
