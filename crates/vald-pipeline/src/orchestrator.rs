//! End-to-end extraction run.
//!
//! The run is a fixed sequence of eight steps:
//! 1. Authenticate (client-credentials token)
//! 2. Fetch tenants
//! 3. Fetch categories and groups per tenant, join groups with categories
//! 4. Fetch profiles per group
//! 5. Extract NordBord tests per tenant
//! 6. Extract ForceFrame tests per tenant
//! 7. Extract ForceDecks tests per tenant
//! 8. Consolidate and write CSV files and spreadsheet sheets
//!
//! Only a failed authentication or an empty tenant list stops the run. Every
//! other failure is logged and the run carries on with what it has.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use vald_api::{Termination, ValdClient};
use vald_auth::TokenProvider;
use vald_config::ValdConfig;
use vald_core::entities::columns;
use vald_core::{Category, Device, Group, RunObserver, Table, Tenant};
use vald_sink::{CsvSink, SheetWrite, SheetsSink};

use crate::consolidate::{
    groups_in_categories, join_groups_with_categories, join_tests_with_profiles, person_view,
};
use crate::error::PipelineError;

/// Number of progress steps reported per run.
pub const TOTAL_STEPS: usize = 8;

const PROFILES_SHEET: &str = "Perfiles_VALD";
const TENANTS_SHEET: &str = "Tenants_VALD";

/// One tenant's paginated run for one device.
#[derive(Debug, Clone)]
pub struct TenantRun {
    pub tenant_id: String,
    pub rows: usize,
    pub pages: usize,
    pub termination: Termination,
}

/// All runs of one device, consolidated.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub device: Device,
    pub rows: usize,
    pub runs: Vec<TenantRun>,
}

/// What a completed run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub tenants: usize,
    pub profiles: usize,
    pub devices: Vec<DeviceSummary>,
    pub files: Vec<PathBuf>,
    pub sheets: Vec<SheetWrite>,
    /// CSV or sheet writes that failed.
    pub sink_failures: usize,
}

struct TenantScope {
    tenant: Tenant,
    groups: Vec<Group>,
}

struct Output {
    file: Option<String>,
    sheet: Option<&'static str>,
    table: Table,
}

/// Drives one extraction run over the configured API and sinks.
pub struct Orchestrator {
    config: ValdConfig,
    client: ValdClient,
    sheets_enabled: bool,
    today: NaiveDate,
}

impl Orchestrator {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: ValdConfig) -> Self {
        let client = ValdClient::new(&config.api).with_max_pages(config.extract.max_pages);
        Self {
            config,
            client,
            sheets_enabled: true,
            today: Utc::now().date_naive(),
        }
    }

    /// Skip the spreadsheet sink even when it is configured.
    #[must_use]
    pub const fn without_sheets(mut self) -> Self {
        self.sheets_enabled = false;
        self
    }

    /// Date ages are computed against in report tables.
    #[must_use]
    pub const fn with_report_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ValdConfig {
        &self.config
    }

    /// Obtain a bearer token for the VALD API.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Authentication`] if the token exchange fails.
    pub async fn authenticate(&self) -> Result<String, PipelineError> {
        let provider = TokenProvider::new(self.client.http().clone(), &self.config.api);
        Ok(provider.fetch_token().await?)
    }

    /// Authenticate and list the tenants the credentials can see.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Authentication`] if the token exchange fails.
    pub async fn tenants(&self) -> Result<Vec<Tenant>, PipelineError> {
        let token = self.authenticate().await?;
        Ok(Tenant::all(&self.client.tenants(&token).await))
    }

    /// Run the full extraction, reporting through `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is incomplete,
    /// [`PipelineError::Authentication`] if no token could be obtained, or
    /// [`PipelineError::NoTenants`] if the tenant list is empty.
    pub async fn run(&self, observer: &dyn RunObserver) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        let csv = CsvSink::new(&self.config.output.dir);
        let mut summary = RunSummary::default();

        observer.progress(1, TOTAL_STEPS, "Authenticating");
        let token = match self.authenticate().await {
            Ok(token) => token,
            Err(e) => {
                report(observer, &format!("Authentication failed, aborting: {e}"));
                return Err(e);
            }
        };
        report(observer, "Authenticated");

        observer.progress(2, TOTAL_STEPS, "Fetching tenants");
        let tenants_table = self.client.tenants(&token).await;
        let tenants = Tenant::all(&tenants_table);
        if tenants.is_empty() {
            report(observer, "No tenants returned, aborting");
            return Err(PipelineError::NoTenants);
        }
        summary.tenants = tenants.len();
        report(observer, &format!("Found {} tenant(s)", tenants.len()));
        write_csv(&csv, "tenants", &tenants_table, &mut summary);

        observer.progress(3, TOTAL_STEPS, "Fetching categories and groups");
        let mut scopes = Vec::with_capacity(tenants.len());
        for (i, tenant) in tenants.iter().enumerate() {
            report(
                observer,
                &format!("Tenant {}/{}: {}", i + 1, tenants.len(), tenant.name),
            );
            let groups = self.tenant_groups(&token, tenant, &csv, &mut summary).await;
            report(observer, &format!("  {} group(s) in scope", groups.len()));
            scopes.push(TenantScope {
                tenant: tenant.clone(),
                groups,
            });
        }

        observer.progress(4, TOTAL_STEPS, "Fetching profiles");
        let mut profiles = Table::new();
        for scope in &scopes {
            for group in &scope.groups {
                self.client
                    .profiles(&token, &scope.tenant.id, group, &mut profiles)
                    .await;
            }
        }
        summary.profiles = profiles.len();
        report(observer, &format!("Collected {} profile row(s)", profiles.len()));

        let mut device_tables = Vec::with_capacity(Device::ALL.len());
        for (step, device) in (5..).zip(Device::ALL) {
            observer.progress(step, TOTAL_STEPS, &format!("Extracting {device} tests"));
            let (table, device_summary) = self.extract_device(&token, &tenants, device, observer).await;
            summary.devices.push(device_summary);
            device_tables.push((device, table));
        }

        observer.progress(8, TOTAL_STEPS, "Saving results");
        let mut outputs = vec![Output {
            file: Some("all_profiles".into()),
            sheet: Some(PROFILES_SHEET),
            table: profiles.clone(),
        }];
        for (device, table) in device_tables {
            let report_table = person_view(&join_tests_with_profiles(&table, &profiles), self.today);
            outputs.push(Output {
                file: Some(format!("all_{}", device.slug())),
                sheet: Some(device.sheet_name()),
                table,
            });
            outputs.push(Output {
                file: Some(format!("report_{}", device.slug())),
                sheet: None,
                table: report_table,
            });
        }
        outputs.push(Output {
            file: None,
            sheet: Some(TENANTS_SHEET),
            table: tenants_table,
        });

        for output in &outputs {
            let Some(file) = &output.file else { continue };
            if output.table.is_empty() {
                tracing::debug!(file = %file, "no rows, skipping csv");
                continue;
            }
            write_csv(&csv, file, &output.table, &mut summary);
        }
        report(observer, &format!("Wrote {} file(s) to {}", summary.files.len(), csv.dir().display()));

        self.write_sheets(&outputs, observer, &mut summary).await;

        report(observer, "Extraction complete");
        Ok(summary)
    }

    /// Categories and groups of one tenant, filtered to the configured
    /// category and joined. Intermediate tables are written as CSV.
    async fn tenant_groups(
        &self,
        token: &str,
        tenant: &Tenant,
        csv: &CsvSink,
        summary: &mut RunSummary,
    ) -> Vec<Group> {
        let mut categories = self.client.categories(token, &tenant.id).await;
        if let Some(wanted) = self.config.extract.category_filter() {
            categories.retain(|row| row.text(columns::NAME).as_deref() == Some(wanted));
        }
        write_csv(csv, &format!("categories_{}", tenant.id), &categories, summary);

        let mut groups = self.client.groups(token, &tenant.id).await;
        if self.config.extract.category_filter().is_some() {
            let ids: HashSet<String> = Category::all(&categories).into_iter().map(|c| c.id).collect();
            groups = groups_in_categories(&groups, &ids);
        }
        write_csv(csv, &format!("groups_{}", tenant.id), &groups, summary);

        if categories.is_empty() || groups.is_empty() {
            tracing::info!(tenant_id = %tenant.id, "no categories or groups in scope, skipping profiles");
            return Vec::new();
        }
        let joined = join_groups_with_categories(&groups, &categories);
        write_csv(
            csv,
            &format!("groups_with_categories_{}", tenant.id),
            &joined,
            summary,
        );
        Group::all(&joined)
    }

    async fn extract_device(
        &self,
        token: &str,
        tenants: &[Tenant],
        device: Device,
        observer: &dyn RunObserver,
    ) -> (Table, DeviceSummary) {
        let start = self.config.extract.watermark();
        let profile_filter = self.config.extract.profile_filter();
        let mut combined = Table::new();
        let mut runs = Vec::with_capacity(tenants.len());

        for tenant in tenants {
            let run = self
                .client
                .extract_tests(token, &tenant.id, device, &start, profile_filter)
                .await;
            let message = if run.termination.is_normal() {
                format!("  {device} / {}: {} record(s) in {} page(s)", tenant.name, run.table.len(), run.pages)
            } else {
                format!(
                    "  {device} / {}: stopped early ({:?}), keeping {} record(s)",
                    tenant.name,
                    run.termination,
                    run.table.len()
                )
            };
            report(observer, &message);
            runs.push(TenantRun {
                tenant_id: tenant.id.clone(),
                rows: run.table.len(),
                pages: run.pages,
                termination: run.termination,
            });
            combined.append(run.table);
        }

        let summary = DeviceSummary {
            device,
            rows: combined.len(),
            runs,
        };
        (combined, summary)
    }

    async fn write_sheets(
        &self,
        outputs: &[Output],
        observer: &dyn RunObserver,
        summary: &mut RunSummary,
    ) {
        if !self.sheets_enabled {
            return;
        }
        if !self.config.sheets.is_configured() {
            tracing::info!("spreadsheet not configured, skipping upload");
            return;
        }

        let sink = match SheetsSink::connect(self.client.http().clone(), &self.config.sheets).await {
            Ok(sink) => sink,
            Err(e) => {
                report(observer, &format!("Spreadsheet upload skipped: {e}"));
                summary.sink_failures += 1;
                return;
            }
        };

        for output in outputs {
            let Some(sheet) = output.sheet else { continue };
            if output.table.is_empty() {
                continue;
            }
            match sink.write_table(sheet, &output.table).await {
                Ok(write) => {
                    report(observer, &format!("Uploaded {} row(s) to sheet {sheet}", write.rows));
                    summary.sheets.push(write);
                }
                Err(e) => {
                    report(observer, &format!("Upload to sheet {sheet} failed: {e}"));
                    summary.sink_failures += 1;
                }
            }
        }
    }
}

/// Run a full extraction with `config`.
///
/// # Errors
///
/// See [`Orchestrator::run`].
pub async fn run_extraction(
    config: &ValdConfig,
    observer: &dyn RunObserver,
) -> Result<RunSummary, PipelineError> {
    Orchestrator::new(config.clone()).run(observer).await
}

fn write_csv(csv: &CsvSink, name: &str, table: &Table, summary: &mut RunSummary) {
    match csv.write_table(name, table) {
        Ok(path) => summary.files.push(path),
        Err(e) => {
            tracing::warn!(file = name, %e, "csv write failed");
            summary.sink_failures += 1;
        }
    }
}

fn report(observer: &dyn RunObserver, message: &str) {
    tracing::info!("{message}");
    observer.log(message);
}
