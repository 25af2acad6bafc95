//! Watermark-paginated extraction of device tests.
//!
//! The tests endpoints only understand "records modified since X". Each page
//! is requested with the current watermark; the next watermark is read from
//! the last record of the page. When the server keeps answering with the same
//! cursor the watermark is pushed forward by one millisecond so the run cannot
//! spin on one page.
//!
//! ```text
//!   Fetching ──200, rows──▶ Accumulating ──new cursor──▶ Fetching
//!      │                        │
//!      │                        └──same cursor──▶ StalledRecovery ──+1ms──▶ Fetching
//!      └──empty / 204 / error / page ceiling──▶ Terminated
//! ```

use vald_core::entities::columns;
use vald_core::{Cell, Device, Record, Table, Watermark};

use crate::ValdClient;
use crate::decode::PageShape;
use crate::error::ApiError;
use crate::http::check_response;

/// Candidate modification-timestamp fields, first match wins.
pub const TIMESTAMP_FIELDS: [&str; 6] = [
    "modifiedDateUtc",
    "modifiedDate",
    "lastModified",
    "updatedAt",
    "dateModified",
    "modified",
];

/// Why a paginated run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A page came back with no records.
    Exhausted,
    /// The server answered 204.
    NoContent,
    /// The last record of a page had none of [`TIMESTAMP_FIELDS`].
    NoTimestampField,
    /// The server answered with a status other than 200 or 204.
    HttpStatus { status: u16, body: String },
    /// The request never got a response.
    Transport(String),
    /// A 200 body that is not an accepted page shape.
    Malformed(String),
    /// A stalled watermark could not be parsed, so it could not be bumped.
    UnparseableWatermark(String),
    /// The page ceiling was reached with data possibly remaining.
    PageLimit,
}

impl Termination {
    /// True for the two "no more data" outcomes.
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::NoContent)
    }
}

impl From<ApiError> for Termination {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Transport(e.to_string()),
            ApiError::Status { status, body } => Self::HttpStatus { status, body },
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Result of one paginated run. Records fetched before an abnormal stop are
/// kept.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub device: Device,
    pub tenant_id: String,
    /// Every record of every page, in order, post-processed.
    pub table: Table,
    /// Requests issued.
    pub pages: usize,
    /// Times the watermark was bumped to break a stall.
    pub stalls: usize,
    /// Watermark of the last request issued.
    pub watermark: Watermark,
    pub termination: Termination,
}

enum State {
    Fetching,
    Accumulating(Vec<Record>),
    StalledRecovery,
    Terminated(Termination),
}

enum Page {
    Batch(Vec<Record>),
    NoContent,
}

/// The modification timestamp of `record`, from the first of
/// [`TIMESTAMP_FIELDS`] that holds a non-null value.
#[must_use]
pub fn record_watermark(record: &Record) -> Option<Watermark> {
    TIMESTAMP_FIELDS.iter().find_map(|field| {
        let cell = Cell::from_json(record.get(*field)?);
        (!cell.is_null()).then(|| Watermark::new(cell.to_text()))
    })
}

/// True when advancing from `current` to `candidate` would not move the
/// cursor forward: the same string, the same instant, or an earlier instant.
#[must_use]
pub fn is_stall(current: &Watermark, candidate: &Watermark) -> bool {
    candidate.same_instant(current) || candidate.is_before(current)
}

impl ValdClient {
    /// Fetch every test of `device` for one tenant modified at or after
    /// `start`.
    ///
    /// Never fails: every stop reason is reported in
    /// [`Extraction::termination`] alongside whatever was fetched.
    pub async fn extract_tests(
        &self,
        token: &str,
        tenant_id: &str,
        device: Device,
        start: &Watermark,
        profile_id: Option<&str>,
    ) -> Extraction {
        let url = self.config.tests_url(device);
        let mut watermark = start.clone();
        let mut records: Vec<Record> = Vec::new();
        let mut pages = 0;
        let mut stalls = 0;
        let mut state = State::Fetching;

        let termination = loop {
            state = match state {
                State::Fetching if pages >= self.max_pages => {
                    State::Terminated(Termination::PageLimit)
                }
                State::Fetching => {
                    pages += 1;
                    match self
                        .fetch_page(url, token, tenant_id, &watermark, profile_id)
                        .await
                    {
                        Ok(Page::NoContent) => State::Terminated(Termination::NoContent),
                        Ok(Page::Batch(batch)) if batch.is_empty() => {
                            State::Terminated(Termination::Exhausted)
                        }
                        Ok(Page::Batch(batch)) => State::Accumulating(batch),
                        Err(e) => State::Terminated(e.into()),
                    }
                }
                State::Accumulating(batch) => {
                    let candidate = batch.last().and_then(record_watermark);
                    tracing::debug!(
                        %device, tenant_id, page = pages, rows = batch.len(), watermark = %watermark,
                        "page fetched"
                    );
                    records.extend(batch);
                    match candidate {
                        None => State::Terminated(Termination::NoTimestampField),
                        Some(next) if is_stall(&watermark, &next) => State::StalledRecovery,
                        Some(next) => {
                            watermark = next;
                            State::Fetching
                        }
                    }
                }
                State::StalledRecovery => match watermark.bumped() {
                    Ok(next) => {
                        stalls += 1;
                        tracing::debug!(%device, tenant_id, from = %watermark, to = %next, "watermark stalled, bumping");
                        watermark = next;
                        State::Fetching
                    }
                    Err(e) => State::Terminated(Termination::UnparseableWatermark(e.to_string())),
                },
                State::Terminated(termination) => break termination,
            };
        };

        log_termination(device, tenant_id, pages, records.len(), &termination);

        Extraction {
            device,
            tenant_id: tenant_id.to_string(),
            table: post_process(&records, tenant_id),
            pages,
            stalls,
            watermark,
            termination,
        }
    }

    async fn fetch_page(
        &self,
        url: &str,
        token: &str,
        tenant_id: &str,
        watermark: &Watermark,
        profile_id: Option<&str>,
    ) -> Result<Page, ApiError> {
        let mut params = vec![("tenantId", tenant_id), ("modifiedFromUtc", watermark.as_str())];
        if let Some(profile_id) = profile_id {
            params.push(("profileId", profile_id));
        }
        let resp = self.get(url, token, &params).await?;
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Page::NoContent);
        }
        let body = check_response(resp).await?.text().await?;
        Ok(Page::Batch(PageShape::decode(&body)?.into_batch()))
    }
}

fn log_termination(device: Device, tenant_id: &str, pages: usize, rows: usize, how: &Termination) {
    match how {
        Termination::Exhausted | Termination::NoContent => {
            tracing::info!(%device, tenant_id, pages, rows, "extraction complete");
        }
        Termination::PageLimit => {
            tracing::warn!(%device, tenant_id, pages, rows, "page limit reached, stopping early");
        }
        Termination::HttpStatus { status, body } => {
            tracing::warn!(%device, tenant_id, pages, rows, status, body = %body, "page request failed, keeping partial result");
        }
        other => {
            tracing::warn!(%device, tenant_id, pages, rows, reason = ?other, "extraction stopped, keeping partial result");
        }
    }
}

/// Build the result table: parse date/time columns where possible and tag
/// every row with its tenant.
fn post_process(records: &[Record], tenant_id: &str) -> Table {
    let mut table = Table::from_records(records);
    if table.is_empty() {
        return table;
    }
    let temporal: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| {
            let lower = c.to_ascii_lowercase();
            lower.contains("date") || lower.contains("time")
        })
        .cloned()
        .collect();
    for column in &temporal {
        // Columns come from the table itself, so the lookup cannot miss.
        let _ = table.map_column(column, Cell::into_timestamp_lossless);
    }
    table.set_constant(columns::TENANT_ID, &Cell::from(tenant_id));
    table
}
