//! DMW Export Core Library
//!
//! Pulls the public "approved job orders" listing from the DMW master API,
//! one jobsite at a time, and writes it out as CSV and/or XLSX files.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - HTTP transport and the sequential page aggregator
//! - [`normalize`] - flattening nested records into a column-stable table
//! - [`export`] - CSV/XLSX writers and the file naming scheme
//! - [`pipeline`] - one export run, end to end
//! - [`config`] - JSON configuration file
//! - [`schedule`] - monthly scheduled runs (Windows Task Scheduler)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod export;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod schedule;
mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, ConfigSource, LoadedConfig, load_config, save_config};
pub use export::{ExportError, ExportFormat, MonthStamp, WriteOutcome, write_table};
pub use fetch::{
    ApiClient, FetchError, FetchOutcome, HttpTransport, LogProgress, NoProgress, PageAggregator,
    PageMetadata, ProgressObserver, RawRecord, TransportProfile, TransportSettings,
};
pub use normalize::{FlatTable, normalize};
pub use pipeline::{ExportRequest, PipelineError, RunSummary, run_export, run_with_aggregator};
