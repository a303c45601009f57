//! One export run: fetch every page, flatten, write files.

use std::num::NonZeroU32;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::export::{ExportError, ExportFormat, MonthStamp, WriteOutcome, write_table};
use crate::fetch::{ApiClient, FetchError, HttpTransport, PageAggregator, ProgressObserver};
use crate::normalize::normalize;

/// Errors that abort an export run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Page 1 (or client setup) failed; nothing was collected.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Rows were collected but writing them failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Jobsite (country) to export.
    pub jobsite: String,
    /// Directory receiving the files.
    pub output_dir: PathBuf,
    /// Formats to write.
    pub formats: Vec<ExportFormat>,
    /// Month stamp for file names; `None` means the current month.
    pub month: Option<MonthStamp>,
    /// Page cap for testing and debugging.
    pub max_pages: Option<NonZeroU32>,
}

impl ExportRequest {
    /// Request covering everything the config describes.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            jobsite: config.jobsite.clone(),
            output_dir: config.output_dir.clone(),
            formats: config.export_formats(),
            month: None,
            max_pages: None,
        }
    }
}

/// What a run collected and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows collected.
    pub rows: usize,
    /// Columns in the flattened table.
    pub columns: usize,
    /// Total reported by the server.
    pub reported_total: u64,
    /// Pages fetched successfully.
    pub pages_fetched: u32,
    /// Pages the run intended to fetch.
    pub pages_requested: u32,
    /// Whether a page failure cut the run short.
    pub truncated: bool,
    /// The failing page, when truncated.
    pub failed_page: Option<u32>,
    /// Files written.
    pub write: WriteOutcome,
}

/// Runs the pipeline against an already-built aggregator.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] when page 1 fails and
/// [`PipelineError::Export`] when writing fails.
#[instrument(skip_all, fields(jobsite = %request.jobsite))]
pub async fn run_with_aggregator<T: HttpTransport>(
    aggregator: &PageAggregator<T>,
    request: &ExportRequest,
    observer: &dyn ProgressObserver,
) -> Result<RunSummary, PipelineError> {
    let outcome = aggregator
        .fetch_all(&request.jobsite, request.max_pages, observer)
        .await?;

    if outcome.truncated {
        warn!(
            failed_page = ?outcome.failed_page,
            rows = outcome.rows.len(),
            "pagination truncated; exporting partial data"
        );
    }

    let table = normalize(&outcome.rows);
    let write = write_table(
        &table,
        &request.output_dir,
        &request.jobsite,
        request.month,
        &request.formats,
    )?;

    let summary = RunSummary {
        rows: outcome.rows.len(),
        columns: table.columns().len(),
        reported_total: outcome.meta.total,
        pages_fetched: outcome.pages_fetched,
        pages_requested: outcome.pages_requested,
        truncated: outcome.truncated,
        failed_page: outcome.failed_page,
        write,
    };
    info!(
        rows = summary.rows,
        columns = summary.columns,
        files = summary.write.paths().len(),
        truncated = summary.truncated,
        "export run finished"
    );
    Ok(summary)
}

/// Builds the API client from `config` and runs the pipeline.
///
/// # Errors
///
/// Same as [`run_with_aggregator`], plus client construction failures.
pub async fn run_export(
    config: &AppConfig,
    request: &ExportRequest,
    observer: &dyn ProgressObserver,
) -> Result<RunSummary, PipelineError> {
    let client = ApiClient::new(&config.transport_settings())?;
    let aggregator = PageAggregator::new(client).with_polite_delay(config.polite_delay());
    run_with_aggregator(&aggregator, request, observer).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;
    use crate::fetch::NoProgress;

    struct FixedTransport {
        pages: Vec<Result<Value, u16>>,
    }

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn fetch_page(&self, _jobsite: &str, page: u32) -> Result<Value, FetchError> {
            match &self.pages[(page - 1) as usize] {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(FetchError::http_status(page, *status, "")),
            }
        }
    }

    fn request(dir: &TempDir) -> ExportRequest {
        ExportRequest {
            jobsite: "Czech republic".to_string(),
            output_dir: dir.path().to_path_buf(),
            formats: vec![ExportFormat::Csv],
            month: Some(MonthStamp::new(2025, 7).unwrap()),
            max_pages: None,
        }
    }

    fn aggregator(pages: Vec<Result<Value, u16>>) -> PageAggregator<FixedTransport> {
        PageAggregator::new(FixedTransport { pages }).with_polite_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_run_writes_csv_and_reports_summary() {
        let dir = TempDir::new().unwrap();
        let aggregator = aggregator(vec![
            Ok(json!({"meta": {"total": 2, "perPage": 1, "lastPage": 2}, "data": [{"id": 1}]})),
            Ok(json!({"data": [{"id": 2, "employer": {"name": "Acme"}}]})),
        ]);
        let seen = Mutex::new(Vec::new());
        let observer = |msg: &str| seen.lock().unwrap().push(msg.to_string());

        let summary = run_with_aggregator(&aggregator, &request(&dir), &observer).await.unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 2);
        assert!(!summary.truncated);
        let expected = dir
            .path()
            .join("approved-job-orders_Czech-republic_2025-07.csv");
        assert_eq!(summary.write, WriteOutcome::Written(vec![expected.clone()]));
        assert!(expected.exists());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().unwrap(), "Collected 2 rows (API total said 2).");
        assert!(seen.iter().all(|msg| !msg.starts_with("Wrote: ")));
    }

    #[tokio::test]
    async fn test_run_with_no_rows_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let aggregator = aggregator(vec![Ok(json!({"meta": {"total": 0}, "data": []}))]);
        let summary = run_with_aggregator(&aggregator, &request(&dir), &NoProgress).await.unwrap();
        assert_eq!(summary.write, WriteOutcome::NothingToWrite);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_with_fieldless_records_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let aggregator = aggregator(vec![Ok(
            json!({"meta": {"total": 2, "lastPage": 1}, "data": [{}, {}]}),
        )]);
        let request = ExportRequest {
            formats: vec![ExportFormat::Csv, ExportFormat::Xlsx],
            ..request(&dir)
        };
        let summary = run_with_aggregator(&aggregator, &request, &NoProgress).await.unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 0);
        assert_eq!(summary.write, WriteOutcome::NothingToWrite);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_truncated_still_writes_partial_data() {
        let dir = TempDir::new().unwrap();
        let aggregator = aggregator(vec![
            Ok(json!({"meta": {"total": 3, "lastPage": 3}, "data": [{"id": 1}]})),
            Err(429),
            Ok(json!({"data": [{"id": 3}]})),
        ]);
        let summary = run_with_aggregator(&aggregator, &request(&dir), &NoProgress).await.unwrap();
        assert!(summary.truncated);
        assert_eq!(summary.failed_page, Some(2));
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.write.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_run_page_one_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let aggregator = aggregator(vec![Err(403)]);
        let err = run_with_aggregator(&aggregator, &request(&dir), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::HttpStatus { status: 403, .. })));
    }

    #[test]
    fn test_request_from_config() {
        let config = AppConfig {
            jobsite: "Japan".to_string(),
            formats: vec!["xlsx".to_string()],
            ..AppConfig::default()
        };
        let request = ExportRequest::from_config(&config);
        assert_eq!(request.jobsite, "Japan");
        assert_eq!(request.formats, vec![ExportFormat::Xlsx]);
        assert_eq!(request.month, None);
        assert_eq!(request.max_pages, None);
    }
}
