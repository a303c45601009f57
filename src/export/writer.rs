//! Writes a [`FlatTable`] to every requested format.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::csv::write_csv;
use super::error::ExportError;
use super::filename::{MonthStamp, export_file_name};
use super::format::ExportFormat;
use super::xlsx::write_xlsx;
use crate::normalize::FlatTable;

/// Result of an export write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The table had no rows; no files were created.
    NothingToWrite,
    /// Paths written, in canonical format order (csv before xlsx).
    Written(Vec<PathBuf>),
}

impl WriteOutcome {
    /// Paths written; empty for [`WriteOutcome::NothingToWrite`].
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::NothingToWrite => &[],
            Self::Written(paths) => paths,
        }
    }
}

/// Writes `table` into `output_dir` once per format.
///
/// `month` defaults to the current local month. Existing files at the
/// computed paths are overwritten.
///
/// # Errors
///
/// Returns [`ExportError`] when the directory cannot be created or any file
/// fails to write. Files written before the failure are left in place.
#[instrument(skip(table, formats), fields(rows = table.row_count()))]
pub fn write_table(
    table: &FlatTable,
    output_dir: &Path,
    jobsite: &str,
    month: Option<MonthStamp>,
    formats: &[ExportFormat],
) -> Result<WriteOutcome, ExportError> {
    if table.is_empty() {
        debug!("empty table; nothing to write");
        return Ok(WriteOutcome::NothingToWrite);
    }

    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::io(output_dir, e))?;
    let month = month.unwrap_or_else(MonthStamp::current);

    let mut ordered = formats.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut written = Vec::with_capacity(ordered.len());
    for format in ordered {
        let path = output_dir.join(export_file_name(jobsite, month, format));
        match format {
            ExportFormat::Csv => write_csv(table, &path)?,
            ExportFormat::Xlsx => write_xlsx(table, &path)?,
        }
        info!(path = %path.display(), %format, "export written");
        written.push(path);
    }

    Ok(WriteOutcome::Written(written))
}
