//! VALD external API configuration: client credentials and endpoint URLs.
//!
//! Every URL defaults to the vendor's production host and can be overridden
//! (tests point them at a local mock server).

use serde::{Deserialize, Serialize};
use vald_core::Device;

fn default_token_url() -> String {
    String::from("https://security.valdperformance.com/connect/token")
}

fn default_tenants_url() -> String {
    String::from("https://prd-aue-api-externaltenants.valdperformance.com/tenants")
}

fn default_categories_url() -> String {
    String::from("https://prd-aue-api-externaltenants.valdperformance.com/categories")
}

fn default_groups_url() -> String {
    String::from("https://prd-aue-api-externaltenants.valdperformance.com/groups")
}

fn default_profiles_url() -> String {
    String::from("https://prd-aue-api-externalprofile.valdperformance.com/profiles")
}

fn default_nordbord_url() -> String {
    String::from("https://prd-aue-api-externalnordbord.valdperformance.com/tests/v2")
}

fn default_forceframe_url() -> String {
    String::from("https://prd-aue-api-externalforceframe.valdperformance.com/tests/v2")
}

fn default_forcedecks_url() -> String {
    String::from("https://prd-aue-api-extforcedecks.valdperformance.com/tests")
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// OAuth client id for the client-credentials grant.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret for the client-credentials grant.
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_tenants_url")]
    pub tenants_url: String,

    #[serde(default = "default_categories_url")]
    pub categories_url: String,

    #[serde(default = "default_groups_url")]
    pub groups_url: String,

    #[serde(default = "default_profiles_url")]
    pub profiles_url: String,

    #[serde(default = "default_nordbord_url")]
    pub nordbord_url: String,

    #[serde(default = "default_forceframe_url")]
    pub forceframe_url: String,

    #[serde(default = "default_forcedecks_url")]
    pub forcedecks_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
            tenants_url: default_tenants_url(),
            categories_url: default_categories_url(),
            groups_url: default_groups_url(),
            profiles_url: default_profiles_url(),
            nordbord_url: default_nordbord_url(),
            forceframe_url: default_forceframe_url(),
            forcedecks_url: default_forcedecks_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Check if the client credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Paginated tests endpoint for a device.
    #[must_use]
    pub fn tests_url(&self, device: Device) -> &str {
        match device {
            Device::NordBord => &self.nordbord_url,
            Device::ForceFrame => &self.forceframe_url,
            Device::ForceDecks => &self.forcedecks_url,
        }
    }

    /// Point every endpoint at `base` (mock servers, staging hosts).
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{base}/connect/token");
        self.tenants_url = format!("{base}/tenants");
        self.categories_url = format!("{base}/categories");
        self.groups_url = format!("{base}/groups");
        self.profiles_url = format!("{base}/profiles");
        self.nordbord_url = format!("{base}/nordbord/tests/v2");
        self.forceframe_url = format!("{base}/forceframe/tests/v2");
        self.forcedecks_url = format!("{base}/forcedecks/tests");
        self
    }
}
