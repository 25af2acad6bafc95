//! Google Sheets output over the Sheets v4 REST API.
//!
//! Each table replaces the full contents of one sheet. A missing sheet is
//! created sized to the data, capped at [`CREATE_MAX_ROWS`] by
//! [`CREATE_MAX_COLUMNS`]. Tables longer than [`MAX_UPLOAD_ROWS`] are cut
//! short with a warning; there is no batched upload.

use serde_json::{Value, json};
use vald_auth::ServiceAccountKey;
use vald_config::SheetsConfig;
use vald_core::Table;

use crate::error::SinkError;

/// Data rows uploaded per sheet, not counting the header.
pub const MAX_UPLOAD_ROWS: usize = 50_000;
/// Row ceiling when sizing a newly created sheet.
pub const CREATE_MAX_ROWS: usize = 5_000;
/// Column ceiling when sizing a newly created sheet.
pub const CREATE_MAX_COLUMNS: usize = 26;

/// Outcome of one sheet write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetWrite {
    pub sheet: String,
    /// Data rows uploaded (header excluded).
    pub rows: usize,
    pub created: bool,
    pub truncated: bool,
}

/// Writes tables into sheets of one spreadsheet.
pub struct SheetsSink {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsSink {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Resolve the spreadsheet and service-account credentials from
    /// `config` and obtain an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::NotConfigured`] if no spreadsheet or credential
    /// source is set, [`SinkError::Credentials`] if the key cannot be read,
    /// or [`SinkError::Auth`] if the token exchange fails.
    pub async fn connect(http: reqwest::Client, config: &SheetsConfig) -> Result<Self, SinkError> {
        let spreadsheet_id = config
            .spreadsheet_id()
            .ok_or(SinkError::NotConfigured("sheets.spreadsheet"))?;
        let payload = config
            .credentials_payload()
            .map_err(|e| SinkError::Credentials(e.to_string()))?
            .ok_or(SinkError::NotConfigured("sheets.credentials_json / sheets.credentials_file"))?;
        let key = ServiceAccountKey::from_json(&payload)?;
        let token = key.fetch_access_token(&http).await?;
        tracing::debug!(spreadsheet_id, "connected to spreadsheet");
        Ok(Self::new(http, &config.api_base_url, spreadsheet_id, token))
    }

    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Replace the contents of `sheet` with `table`, header row first.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if any spreadsheet API call fails. Nothing is
    /// retried.
    pub async fn write_table(&self, sheet: &str, table: &Table) -> Result<SheetWrite, SinkError> {
        let mut grid = table.to_text_grid();
        let truncated = table.len() > MAX_UPLOAD_ROWS;
        if truncated {
            tracing::warn!(
                sheet,
                rows = table.len(),
                limit = MAX_UPLOAD_ROWS,
                "table too large for one upload, truncating"
            );
            grid.truncate(MAX_UPLOAD_ROWS + 1);
        }
        let rows = grid.len() - 1;

        let created = if self.sheet_exists(sheet).await? {
            self.clear(sheet).await?;
            false
        } else {
            self.add_sheet(sheet, rows + 1, table.columns().len()).await?;
            true
        };

        self.update_values(sheet, grid).await?;
        tracing::info!(sheet, rows, created, "sheet written");
        Ok(SheetWrite {
            sheet: sheet.to_string(),
            rows,
            created,
            truncated,
        })
    }

    async fn sheet_exists(&self, sheet: &str) -> Result<bool, SinkError> {
        let url = format!(
            "{}/spreadsheets/{}?fields=sheets.properties.title",
            self.base_url, self.spreadsheet_id
        );
        let resp = self.http.get(url).bearer_auth(&self.access_token).send().await?;
        let body: Value = check_response(resp).await?.json().await?;
        let sheets = body
            .get("sheets")
            .and_then(Value::as_array)
            .ok_or_else(|| SinkError::Parse("spreadsheet metadata without sheets".into()))?;
        Ok(sheets.iter().any(|s| {
            s.pointer("/properties/title").and_then(Value::as_str) == Some(sheet)
        }))
    }

    async fn clear(&self, sheet: &str) -> Result<(), SinkError> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:clear",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(&quoted_range(sheet))
        );
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;
        check_response(resp).await?;
        tracing::debug!(sheet, "cleared existing sheet");
        Ok(())
    }

    async fn add_sheet(&self, sheet: &str, rows: usize, columns: usize) -> Result<(), SinkError> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.base_url, self.spreadsheet_id
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": sheet,
                        "gridProperties": {
                            "rowCount": rows.clamp(1, CREATE_MAX_ROWS),
                            "columnCount": columns.clamp(1, CREATE_MAX_COLUMNS),
                        }
                    }
                }
            }]
        });
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check_response(resp).await?;
        tracing::debug!(sheet, "created sheet");
        Ok(())
    }

    async fn update_values(&self, sheet: &str, grid: Vec<Vec<String>>) -> Result<(), SinkError> {
        let range = format!("{}!A1", quoted_range(sheet));
        let url = format!(
            "{}/spreadsheets/{}/values/{}?valueInputOption=RAW",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(&range)
        );
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": grid,
        });
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}

/// A sheet title in A1 notation, single-quoted so spaces and punctuation
/// survive.
fn quoted_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    if !resp.status().is_success() {
        return Err(SinkError::Api {
            status: resp.status().as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
