//! Month stamps and deterministic export file names.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

use super::format::ExportFormat;

/// Common prefix of every export file.
pub const FILE_PREFIX: &str = "approved-job-orders";

/// Rejected `YYYY-MM` input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{value}': expected YYYY-MM")]
pub struct MonthParseError {
    /// The rejected input.
    pub value: String,
}

/// A calendar month used to stamp export file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthStamp {
    year: i32,
    month: u32,
}

impl MonthStamp {
    /// Creates a stamp, validating the month.
    ///
    /// # Errors
    ///
    /// Returns [`MonthParseError`] when `month` is outside `1..=12` or the
    /// year is outside `1..=9999`.
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=9999).contains(&year) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(MonthParseError {
                value: format!("{year}-{month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time.
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// The calendar month before this one.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Year component.
    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    /// Month component, `1..=12`.
    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthStamp {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthParseError {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || !(1..=2).contains(&month.len())
            || !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// Replaces characters that would break the file name.
#[must_use]
pub fn safe_jobsite(jobsite: &str) -> String {
    jobsite
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect()
}

/// `approved-job-orders_<jobsite>_<YYYY-MM>.<ext>`
#[must_use]
pub fn export_file_name(jobsite: &str, month: MonthStamp, format: ExportFormat) -> String {
    format!(
        "{FILE_PREFIX}_{}_{month}.{}",
        safe_jobsite(jobsite),
        format.extension()
    )
}
