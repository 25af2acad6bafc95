//! # vald-auth
//!
//! Token acquisition for the VALD extractor.
//!
//! - [`client_credentials`]: exchanges the configured client id/secret for the
//!   bearer token every VALD API call carries. One request, no refresh.
//! - [`service_account`]: mints an access token for the spreadsheet API from a
//!   service-account key (RS256-signed JWT assertion).

pub mod client_credentials;
pub mod error;
pub mod service_account;

pub use client_credentials::TokenProvider;
pub use error::AuthError;
pub use service_account::ServiceAccountKey;

use serde::Deserialize;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Encode `application/x-www-form-urlencoded` pairs.
fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// POST a form to an OAuth token endpoint and pull out `access_token`.
async fn exchange(
    http: &reqwest::Client,
    url: &str,
    pairs: &[(&str, &str)],
) -> Result<String, AuthError> {
    let resp = http
        .post(url)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .header(reqwest::header::ACCEPT, "application/json")
        .body(form_body(pairs))
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if status != reqwest::StatusCode::OK {
        return Err(AuthError::AuthenticationFailed {
            status: status.as_u16(),
            message: body,
        });
    }

    serde_json::from_str::<TokenResponse>(&body)
        .ok()
        .and_then(|t| t.access_token)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_body_escapes_reserved_characters() {
        let body = form_body(&[("grant_type", "client_credentials"), ("client_secret", "a&b=c d")]);
        assert_eq!(body, "grant_type=client_credentials&client_secret=a%26b%3Dc%20d");
    }
}
