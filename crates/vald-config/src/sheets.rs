//! Shared spreadsheet destination configuration.
//!
//! Service-account credentials come from one of two interchangeable sources:
//! an inline JSON payload (`credentials_json`, convenient for hosted
//! environments) or a path to the key file (`credentials_file`). When both are
//! set the inline payload wins.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_api_base_url() -> String {
    String::from("https://sheets.googleapis.com/v4")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Spreadsheet URL or bare spreadsheet id.
    #[serde(default)]
    pub spreadsheet: String,

    /// Service-account key as an inline JSON document.
    #[serde(default, deserialize_with = "string_or_document")]
    pub credentials_json: String,

    /// Path to a service-account key file.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

/// Environment providers may hand a JSON payload over already parsed into a
/// map. Re-serialize it so the field always holds the raw document.
fn string_or_document<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet: String::new(),
            credentials_json: String::new(),
            credentials_file: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl SheetsConfig {
    /// Check if a destination and at least one credential source are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.spreadsheet.trim().is_empty()
            && (!self.credentials_json.trim().is_empty() || self.credentials_file.is_some())
    }

    /// Spreadsheet id extracted from the configured reference.
    ///
    /// Accepts `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0` as
    /// well as a bare id. The `#...` fragment is always discarded.
    #[must_use]
    pub fn spreadsheet_id(&self) -> Option<String> {
        let reference = self.spreadsheet.split('#').next().unwrap_or_default().trim();
        if reference.is_empty() {
            return None;
        }
        match reference.split_once("/d/") {
            Some((_, rest)) => rest
                .split(['/', '?'])
                .next()
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            None => Some(reference.to_string()),
        }
    }

    /// Resolve the service-account key payload.
    ///
    /// Returns `Ok(None)` when no credential source is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the key file cannot be read.
    pub fn credentials_payload(&self) -> Result<Option<String>, ConfigError> {
        if !self.credentials_json.trim().is_empty() {
            return Ok(Some(self.credentials_json.clone()));
        }
        let Some(path) = &self.credentials_file else {
            return Ok(None);
        };
        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: "sheets.credentials_file".into(),
                reason: format!("{}: {e}", path.display()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn default_is_not_configured() {
        let config = SheetsConfig::default();
        assert!(!config.is_configured());
        assert!(config.spreadsheet_id().is_none());
        assert_eq!(config.api_base_url, "https://sheets.googleapis.com/v4");
    }

    #[test]
    fn id_from_full_url_drops_fragment() {
        let config = SheetsConfig {
            spreadsheet: "https://docs.google.com/spreadsheets/d/1AbC_xyz/edit#gid=0".into(),
            ..Default::default()
        };
        assert_eq!(config.spreadsheet_id().as_deref(), Some("1AbC_xyz"));
    }

    #[test]
    fn bare_id_passes_through() {
        let config = SheetsConfig {
            spreadsheet: " 1AbC_xyz ".into(),
            ..Default::default()
        };
        assert_eq!(config.spreadsheet_id().as_deref(), Some("1AbC_xyz"));
    }

    #[test]
    fn inline_payload_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"source":"file"}}"#).unwrap();

        let config = SheetsConfig {
            spreadsheet: "id".into(),
            credentials_json: r#"{"source":"inline"}"#.into(),
            credentials_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(
            config.credentials_payload().unwrap().as_deref(),
            Some(r#"{"source":"inline"}"#)
        );
    }

    #[test]
    fn file_payload_used_when_inline_blank() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"source":"file"}}"#).unwrap();

        let config = SheetsConfig {
            credentials_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(
            config.credentials_payload().unwrap().as_deref(),
            Some(r#"{"source":"file"}"#)
        );
    }

    #[test]
    fn missing_file_is_invalid_value() {
        let config = SheetsConfig {
            credentials_file: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(matches!(
            config.credentials_payload(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn no_source_yields_none() {
        assert!(SheetsConfig::default().credentials_payload().unwrap().is_none());
    }
}
