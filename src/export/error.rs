//! Error types for the export module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File system error (create directory, create file, flush, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error writing {path}: {source}")]
    Csv {
        /// The CSV file being written.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Workbook serialization failed.
    #[error("XLSX error writing {path}: {source}")]
    Xlsx {
        /// The workbook being written.
        path: PathBuf,
        /// The underlying workbook error.
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// The table does not fit in a single worksheet.
    #[error("table of {rows} rows x {columns} columns exceeds worksheet limits")]
    SheetLimit {
        /// Data rows in the table.
        rows: usize,
        /// Columns in the table.
        columns: usize,
    },
}

impl ExportError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Creates a workbook error.
    pub fn xlsx(path: impl Into<PathBuf>, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx {
            path: path.into(),
            source,
        }
    }
}
