//! # vald-api
//!
//! HTTP client for the VALD external API.
//!
//! - Resource fetchers ([`ValdClient::tenants`], [`ValdClient::categories`],
//!   [`ValdClient::groups`], [`ValdClient::profiles`]): one request each,
//!   shaped into a [`Table`]. Every failure degrades to an empty table plus a
//!   warning.
//! - [`ValdClient::extract_tests`]: the watermark-paginated extractor for the
//!   three device test datasets.
//!
//! Every call is a single awaited request; nothing here fans out.

pub mod decode;
pub mod pagination;
mod resources;

mod error;
mod http;

pub use decode::PageShape;
pub use error::ApiError;
pub use pagination::{Extraction, TIMESTAMP_FIELDS, Termination};

use std::time::Duration;

use vald_config::{ApiConfig, DEFAULT_MAX_PAGES};
use vald_core::Table;

/// Client for the VALD tenant, profile, and device test services.
pub struct ValdClient {
    http: reqwest::Client,
    config: ApiConfig,
    max_pages: usize,
}

impl ValdClient {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("valdx/0.1")
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            config: config.clone(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Override the page ceiling for paginated runs.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The underlying HTTP client, for sharing connection pools with token
    /// providers.
    #[must_use]
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get(
        &self,
        url: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self
            .http
            .get(http::with_query(url, params))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        Ok(resp)
    }
}

/// Turn a fetcher failure into an empty table, logging why.
fn table_or_log(result: Result<Table, ApiError>, resource: &str, tenant_id: &str) -> Table {
    result.unwrap_or_else(|e| {
        tracing::warn!(resource, tenant_id, %e, "fetch failed, continuing with no rows");
        Table::new()
    })
}
