//! End-to-end pipeline tests: mock API in, files on disk out.

use std::num::NonZeroU32;

use dmw_export_core::config::AppConfig;
use dmw_export_core::export::{ExportFormat, MonthStamp, UTF8_BOM, WriteOutcome};
use dmw_export_core::fetch::{FetchError, NoProgress};
use dmw_export_core::pipeline::{ExportRequest, PipelineError, run_export};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, output: &TempDir) -> AppConfig {
    AppConfig {
        api_base: format!("{}/filter", server.uri()),
        output_dir: output.path().to_path_buf(),
        polite_delay_ms: 0,
        timeout_secs: 5,
        ..AppConfig::default()
    }
}

fn request_for(config: &AppConfig, formats: Vec<ExportFormat>) -> ExportRequest {
    ExportRequest {
        formats,
        month: Some(MonthStamp::new(2025, 9).expect("valid month")),
        ..ExportRequest::from_config(config)
    }
}

#[tokio::test]
async fn test_pipeline_writes_flattened_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"total": 2, "perPage": 1, "lastPage": 2},
            "data": [{"id": 1, "position": "Welder", "employer": {"name": "Acme", "city": "Brno"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 2, "salary": 1500.5}]
        })))
        .mount(&server)
        .await;

    let output = TempDir::new().expect("failed to create temp dir");
    let config = config_for(&server, &output);
    let request = request_for(&config, vec![ExportFormat::Csv, ExportFormat::Xlsx]);

    let summary = run_export(&config, &request, &NoProgress)
        .await
        .expect("run should succeed");

    assert_eq!(summary.rows, 2);
    assert!(!summary.truncated);
    let paths = summary.write.paths();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.exists()));

    let csv_path = output
        .path()
        .join("approved-job-orders_Czech-republic_2025-09.csv");
    let bytes = std::fs::read(&csv_path).expect("csv should exist");
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "employer.city,employer.name,id,position,salary");
    assert_eq!(lines[1], "Brno,Acme,1,Welder,");
    assert_eq!(lines[2], ",,2,,1500.5");
}

#[tokio::test]
async fn test_pipeline_empty_result_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"meta": {"total": 0, "lastPage": 1}, "data": []})),
        )
        .mount(&server)
        .await;

    let output = TempDir::new().expect("failed to create temp dir");
    let config = config_for(&server, &output);
    let request = ExportRequest {
        output_dir: output.path().join("exports"),
        ..request_for(&config, vec![ExportFormat::Csv])
    };

    let summary = run_export(&config, &request, &NoProgress)
        .await
        .expect("run should succeed");

    assert_eq!(summary.write, WriteOutcome::NothingToWrite);
    assert!(!output.path().join("exports").exists());
}

#[tokio::test]
async fn test_pipeline_page_cap_limits_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"total": 50, "perPage": 10, "lastPage": 5},
            "data": [{"id": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 2}]})))
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().expect("failed to create temp dir");
    let config = config_for(&server, &output);
    let request = ExportRequest {
        max_pages: NonZeroU32::new(2),
        ..request_for(&config, vec![ExportFormat::Csv])
    };

    let summary = run_export(&config, &request, &NoProgress)
        .await
        .expect("run should succeed");
    assert_eq!(summary.pages_requested, 2);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.reported_total, 50);
    assert_eq!(summary.rows, 2);
}

#[tokio::test]
async fn test_pipeline_rejects_bad_api_base_before_network() {
    let output = TempDir::new().expect("failed to create temp dir");
    let config = AppConfig {
        api_base: "ftp://example.com/filter".to_string(),
        output_dir: output.path().to_path_buf(),
        ..AppConfig::default()
    };
    let request = request_for(&config, vec![ExportFormat::Csv]);

    let err = run_export(&config, &request, &NoProgress)
        .await
        .expect_err("ftp is not a valid API base");
    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::InvalidBaseUrl { .. })
    ));
}
