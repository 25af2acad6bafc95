//! VALD API error types.

use thiserror::Error;

/// Errors raised while talking to the VALD external API.
///
/// Callers outside this crate rarely see these: fetchers degrade them to an
/// empty table and the paginated extractor maps them onto a
/// [`Termination`](crate::Termination).
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than the one expected.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The body is not JSON, or not JSON of an accepted shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response object lacks the key holding the records.
    #[error("response has no {0:?} array")]
    MissingKey(String),

    /// A 200 response with nothing in it.
    #[error("empty response body")]
    EmptyBody,
}
