//! # vald-config
//!
//! Layered configuration loading for the VALD extractor using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VALD_*` prefix, `__` as separator)
//! 2. Project-level `.vald/config.toml`
//! 3. User-level `~/.config/vald/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VALD_API__CLIENT_ID` -> `api.client_id`,
//! `VALD_EXTRACT__MODIFIED_FROM` -> `extract.modified_from`,
//! `VALD_SHEETS__CREDENTIALS_JSON` -> `sheets.credentials_json`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use vald_config::ValdConfig;
//!
//! let config = ValdConfig::load_with_dotenv().expect("config");
//! if config.api.is_configured() {
//!     println!("watermark: {}", config.extract.modified_from);
//! }
//! ```

mod api;
mod error;
mod extract;
mod output;
mod sheets;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use extract::{DEFAULT_MAX_PAGES, ExtractConfig};
pub use output::OutputConfig;
pub use sheets::SheetsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValdConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

impl ValdConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with an explicit TOML file layered above the
    /// discovered files but below environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the file does not exist, or
    /// see [`Self::load`].
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: "config".into(),
                reason: format!("{} does not exist", path.display()),
            });
        }
        let _ = dotenvy::dotenv();
        Self::figment_with(Some(path))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    fn figment_with(extra: Option<&std::path::Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".vald/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit --config file
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("VALD_").split("__"))
    }

    /// Check that everything a full run needs is present.
    ///
    /// The spreadsheet section is optional: without it, only local files are
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when client credentials are
    /// missing, or [`ConfigError::InvalidValue`] when the starting watermark
    /// is not a timestamp or the page ceiling is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "api".into(),
            });
        }
        if self.extract.watermark().instant().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "extract.modified_from".into(),
                reason: format!("{:?} is not an ISO-8601 timestamp", self.extract.modified_from),
            });
        }
        if self.extract.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "extract.max_pages".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vald").join("config.toml"))
    }
}
