//! Supported export formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// UTF-8 CSV with byte-order mark.
    Csv,
    /// Excel workbook, single sheet.
    Xlsx,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Normalizes free-form format labels.
    ///
    /// Labels are trimmed and lower-cased; unknown labels and duplicates are
    /// dropped, first occurrence wins. An empty result falls back to CSV.
    #[must_use]
    pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<Self> {
        let mut formats = Vec::new();
        for label in labels {
            if let Ok(format) = label.as_ref().parse::<Self>()
                && !formats.contains(&format)
            {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            formats.push(Self::Csv);
        }
        formats
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(format!("unsupported format '{other}' (expected csv or xlsx)")),
        }
    }
}
