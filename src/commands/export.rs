//! Default command: one export run.

use std::num::NonZeroU32;

use anyhow::{Context, Result};
use dmw_export_core::{AppConfig, ExportRequest, RunSummary, WriteOutcome, run_export};
use tracing::{info, warn};

use crate::app::progress_manager::RunProgress;
use crate::cli::RunArgs;

/// Applies per-run CLI overrides on top of the loaded config.
pub(crate) fn apply_run_overrides(config: &mut AppConfig, args: &RunArgs) {
    if let Some(jobsite) = &args.jobsite {
        config.jobsite.clone_from(jobsite);
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    if !args.formats.is_empty() {
        config.formats = args.formats.iter().map(ToString::to_string).collect();
    }
}

/// Builds the run request from the effective config and CLI flags.
pub(crate) fn build_request(config: &AppConfig, args: &RunArgs) -> ExportRequest {
    ExportRequest {
        month: args.effective_month(),
        max_pages: args.max_pages.and_then(NonZeroU32::new),
        ..ExportRequest::from_config(config)
    }
}

/// Lines printed on stdout once the run finishes.
pub(crate) fn confirmation_lines(summary: &RunSummary) -> Vec<String> {
    match &summary.write {
        WriteOutcome::NothingToWrite => vec!["No data returned. Nothing to write.".to_string()],
        WriteOutcome::Written(paths) => paths
            .iter()
            .map(|path| format!("Wrote: {}", path.display()))
            .collect(),
    }
}

pub(crate) async fn run_export_command(
    mut config: AppConfig,
    args: &RunArgs,
    use_spinner: bool,
    quiet: bool,
) -> Result<RunSummary> {
    apply_run_overrides(&mut config, args);
    config.validate().context("invalid run options")?;
    let request = build_request(&config, args);
    info!(
        jobsite = %request.jobsite,
        output_dir = %request.output_dir.display(),
        formats = ?request.formats,
        month = ?request.month,
        max_pages = ?request.max_pages,
        "export run starting"
    );

    let progress = RunProgress::new(use_spinner);
    let result = run_export(&config, &request, progress.observer()).await;
    drop(progress);
    let summary = result.context("export run failed")?;

    if summary.truncated {
        warn!(
            failed_page = ?summary.failed_page,
            pages_fetched = summary.pages_fetched,
            pages_requested = summary.pages_requested,
            "run was truncated; the export contains partial data"
        );
    }
    if !quiet {
        for line in confirmation_lines(&summary) {
            println!("{line}");
        }
    }
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use dmw_export_core::{ExportFormat, MonthStamp};

    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = AppConfig::default();
        let args = RunArgs {
            jobsite: Some("Japan".to_string()),
            output_dir: Some(PathBuf::from("/tmp/out")),
            formats: vec![ExportFormat::Xlsx],
            ..RunArgs::default()
        };
        apply_run_overrides(&mut config, &args);
        assert_eq!(config.jobsite, "Japan");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.export_formats(), vec![ExportFormat::Xlsx]);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = AppConfig::default();
        apply_run_overrides(&mut config, &RunArgs::default());
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_blank_jobsite_override_rejected_before_fetch() {
        let config = AppConfig {
            api_base: "http://127.0.0.1:1/filter".to_string(),
            ..AppConfig::default()
        };
        let args = RunArgs {
            jobsite: Some("   ".to_string()),
            ..RunArgs::default()
        };
        let err = run_export_command(config, &args, false, true)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("jobsite"), "{err:#}");
    }

    #[test]
    fn test_build_request_carries_month_and_page_cap() {
        let args = RunArgs {
            month: Some(MonthStamp::new(2024, 12).unwrap()),
            max_pages: Some(3),
            ..RunArgs::default()
        };
        let request = build_request(&AppConfig::default(), &args);
        assert_eq!(request.month, Some(MonthStamp::new(2024, 12).unwrap()));
        assert_eq!(request.max_pages, NonZeroU32::new(3));
        assert_eq!(request.formats, vec![ExportFormat::Csv]);
    }

    #[test]
    fn test_confirmation_lines() {
        let mut summary = RunSummary {
            rows: 0,
            columns: 0,
            reported_total: 0,
            pages_fetched: 1,
            pages_requested: 1,
            truncated: false,
            failed_page: None,
            write: WriteOutcome::NothingToWrite,
        };
        assert_eq!(confirmation_lines(&summary), vec!["No data returned. Nothing to write."]);

        summary.write = WriteOutcome::Written(vec![PathBuf::from("a.csv"), PathBuf::from("a.xlsx")]);
        assert_eq!(confirmation_lines(&summary), vec!["Wrote: a.csv", "Wrote: a.xlsx"]);
    }
}
