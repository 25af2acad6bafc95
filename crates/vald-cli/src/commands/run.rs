use serde::Serialize;
use vald_api::Termination;
use vald_config::ValdConfig;
use vald_core::Device;
use vald_pipeline::{Orchestrator, RunSummary, TOTAL_STEPS};

use crate::cli::{GlobalFlags, RunArgs};
use crate::output::{output, render_rows};
use crate::progress::StepProgress;

#[derive(Debug, Serialize)]
struct RunResponse {
    tenants: usize,
    profiles: usize,
    devices: Vec<DeviceLine>,
    files: Vec<String>,
    sheets: Vec<String>,
    sink_failures: usize,
}

#[derive(Debug, Serialize)]
struct DeviceLine {
    device: Device,
    rows: usize,
    pages: usize,
    /// Tenants whose pagination stopped abnormally.
    incomplete: Vec<String>,
}

pub async fn handle(args: &RunArgs, flags: &GlobalFlags, mut config: ValdConfig) -> anyhow::Result<()> {
    apply_overrides(&mut config, args);

    let mut orchestrator = Orchestrator::new(config);
    if args.no_sheets {
        orchestrator = orchestrator.without_sheets();
    }

    let progress = StepProgress::new(TOTAL_STEPS, flags.quiet);
    let summary = match orchestrator.run(&progress).await {
        Ok(summary) => {
            progress.finish_ok("done");
            summary
        }
        Err(error) => {
            progress.finish_err("failed");
            return Err(error.into());
        }
    };

    let response = RunResponse::from(&summary);
    output(&response, &response.render(), flags.format)
}

/// Command-line flags win over every configuration source.
fn apply_overrides(config: &mut ValdConfig, args: &RunArgs) {
    if let Some(since) = &args.since {
        config.extract.modified_from.clone_from(since);
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir.clone_from(dir);
    }
    if let Some(category) = &args.category {
        config.extract.category.clone_from(category);
    }
    if let Some(profile) = &args.profile {
        config.extract.profile_id.clone_from(profile);
    }
}

fn termination_label(termination: &Termination) -> String {
    match termination {
        Termination::Exhausted | Termination::NoContent => "complete".into(),
        Termination::NoTimestampField => "no timestamp field".into(),
        Termination::HttpStatus { status, .. } => format!("http {status}"),
        Termination::Transport(_) => "transport error".into(),
        Termination::Malformed(_) => "malformed response".into(),
        Termination::UnparseableWatermark(_) => "unparseable watermark".into(),
        Termination::PageLimit => "page limit".into(),
    }
}

impl From<&RunSummary> for RunResponse {
    fn from(summary: &RunSummary) -> Self {
        Self {
            tenants: summary.tenants,
            profiles: summary.profiles,
            devices: summary
                .devices
                .iter()
                .map(|d| DeviceLine {
                    device: d.device,
                    rows: d.rows,
                    pages: d.runs.iter().map(|r| r.pages).sum(),
                    incomplete: d
                        .runs
                        .iter()
                        .filter(|r| !r.termination.is_normal())
                        .map(|r| format!("{} ({})", r.tenant_id, termination_label(&r.termination)))
                        .collect(),
                })
                .collect(),
            files: summary
                .files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            sheets: summary.sheets.iter().map(|s| s.sheet.clone()).collect(),
            sink_failures: summary.sink_failures,
        }
    }
}

impl RunResponse {
    fn render(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .devices
            .iter()
            .map(|d| {
                vec![
                    d.device.to_string(),
                    d.rows.to_string(),
                    d.pages.to_string(),
                    d.incomplete.join(", "),
                ]
            })
            .collect();
        format!(
            "{} tenant(s), {} profile(s)\n{}\n{} file(s), {} sheet(s), {} failed write(s)",
            self.tenants,
            self.profiles,
            render_rows(&["device", "rows", "pages", "incomplete"], &rows),
            self.files.len(),
            self.sheets.len(),
            self.sink_failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;
    use vald_pipeline::{DeviceSummary, TenantRun};

    use super::*;

    #[test]
    fn flags_override_loaded_config() {
        let mut config = ValdConfig::default();
        config.extract.category = "Academy".into();

        let args = RunArgs {
            since: Some("2024-06-01T00:00:00.000Z".into()),
            output_dir: Some(PathBuf::from("out")),
            category: Some("CBMM".into()),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.extract.modified_from, "2024-06-01T00:00:00.000Z");
        assert_eq!(config.output.dir, Path::new("out"));
        assert_eq!(config.extract.category, "CBMM");
        assert_eq!(config.extract.profile_id, "");
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = ValdConfig::default();
        let before = config.extract.modified_from.clone();
        apply_overrides(&mut config, &RunArgs::default());
        assert_eq!(config.extract.modified_from, before);
    }

    #[test]
    fn summary_lists_incomplete_tenants() {
        let summary = RunSummary {
            tenants: 2,
            profiles: 5,
            devices: vec![DeviceSummary {
                device: Device::NordBord,
                rows: 40,
                runs: vec![
                    TenantRun {
                        tenant_id: "t1".into(),
                        rows: 30,
                        pages: 3,
                        termination: Termination::NoContent,
                    },
                    TenantRun {
                        tenant_id: "t2".into(),
                        rows: 10,
                        pages: 1,
                        termination: Termination::HttpStatus {
                            status: 500,
                            body: String::new(),
                        },
                    },
                ],
            }],
            ..RunSummary::default()
        };

        let response = RunResponse::from(&summary);
        assert_eq!(response.devices[0].pages, 4);
        assert_eq!(response.devices[0].incomplete, ["t2 (http 500)"]);
        assert!(response.render().starts_with("2 tenant(s), 5 profile(s)\n"));
    }
}
