//! Export writer: serializes a flat table to CSV and/or XLSX files.
//!
//! File names are deterministic, `approved-job-orders_<jobsite>_<YYYY-MM>.<ext>`,
//! so a rerun for the same month replaces the previous export.
//!
//! # Example
//!
//! ```no_run
//! use dmw_export_core::export::{ExportFormat, WriteOutcome, write_table};
//! use dmw_export_core::normalize::FlatTable;
//! use std::path::Path;
//!
//! # fn example(table: FlatTable) -> Result<(), Box<dyn std::error::Error>> {
//! match write_table(&table, Path::new("./output"), "Czech republic", None, &[ExportFormat::Csv])? {
//!     WriteOutcome::NothingToWrite => println!("No data returned. Nothing to write."),
//!     WriteOutcome::Written(paths) => println!("wrote {} files", paths.len()),
//! }
//! # Ok(())
//! # }
//! ```

mod csv;
mod error;
mod filename;
mod format;
mod writer;
mod xlsx;

pub use self::csv::UTF8_BOM;
pub use error::ExportError;
pub use filename::{FILE_PREFIX, MonthParseError, MonthStamp, export_file_name, safe_jobsite};
pub use format::ExportFormat;
pub use writer::{WriteOutcome, write_table};
pub use xlsx::{MAX_SHEET_COLUMNS, MAX_SHEET_ROWS};
