//! Shared HTTP helpers for VALD API calls.
//!
//! Query strings are assembled here so every endpoint encodes parameters the
//! same way, and status handling lives in one place.

use crate::error::ApiError;

/// Append URL-encoded query parameters to `url`.
pub fn with_query(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Check an HTTP response for the one status the data endpoints promise.
///
/// Returns the response unchanged on 200. Anything else becomes
/// [`ApiError::Status`] carrying the status code and response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if resp.status() != reqwest::StatusCode::OK {
        return Err(ApiError::Status {
            status: resp.status().as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn query_is_encoded_and_appended() {
        let url = with_query(
            "https://api.test/tests/v2",
            &[("tenantId", "t 1"), ("modifiedFromUtc", "2024-01-01T00:00:00.000Z")],
        );
        assert_eq!(
            url,
            "https://api.test/tests/v2?tenantId=t%201&modifiedFromUtc=2024-01-01T00%3A00%3A00.000Z"
        );
    }

    #[test]
    fn query_extends_existing_query_string() {
        assert_eq!(with_query("https://a/b?x=1", &[("y", "2")]), "https://a/b?x=1&y=2");
        assert_eq!(with_query("https://a/b", &[]), "https://a/b");
    }

    #[tokio::test]
    async fn check_response_ok() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_rejects_no_content() {
        let err = check_response(mock_response(204, "")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn check_response_keeps_error_body() {
        let err = check_response(mock_response(500, "boom")).await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
