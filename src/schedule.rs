//! Monthly unattended runs through the Windows Task Scheduler.
//!
//! Thin wrapper over `schtasks`. The argument vectors are built by pure
//! functions so they can be checked on any platform; running them is only
//! possible on Windows.

use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

/// Name of the scheduled task.
pub const TASK_NAME: &str = "DMW Monthly Export";

/// Default run time, hour.
pub const DEFAULT_HOUR: u8 = 23;

/// Default run time, minute.
pub const DEFAULT_MINUTE: u8 = 55;

/// Highest day of month accepted for a fixed-day schedule.
pub const MAX_FIXED_DAY: u8 = 27;

/// Errors raised by schedule management.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Task scheduling is only implemented for Windows.
    #[error("scheduled tasks are only supported on Windows")]
    Unsupported,

    /// A schedule field is out of range.
    #[error("invalid schedule: {0}")]
    Invalid(String),

    /// `schtasks` could not be started.
    #[error("failed to run schtasks: {0}")]
    Spawn(#[source] std::io::Error),

    /// `schtasks` exited with a failure status.
    #[error("schtasks exited with code {code}: {stderr}")]
    Failed {
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },
}

/// Day of the month a task runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDay {
    /// The last day of every month.
    LastDay,
    /// A fixed day, `1..=27` so it exists in every month.
    Day(u8),
}

/// When the monthly task runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySchedule {
    /// Hour, `0..=23`.
    pub hour: u8,
    /// Minute, `0..=59`.
    pub minute: u8,
    /// Day of month.
    pub day: ScheduleDay,
}

impl Default for MonthlySchedule {
    fn default() -> Self {
        Self {
            hour: DEFAULT_HOUR,
            minute: DEFAULT_MINUTE,
            day: ScheduleDay::LastDay,
        }
    }
}

impl MonthlySchedule {
    /// Checks field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Invalid`] for out-of-range fields.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.hour > 23 {
            return Err(ScheduleError::Invalid(format!("hour {} (expected 0..=23)", self.hour)));
        }
        if self.minute > 59 {
            return Err(ScheduleError::Invalid(format!(
                "minute {} (expected 0..=59)",
                self.minute
            )));
        }
        if let ScheduleDay::Day(day) = self.day
            && !(1..=MAX_FIXED_DAY).contains(&day)
        {
            return Err(ScheduleError::Invalid(format!(
                "day {day} (expected 1..={MAX_FIXED_DAY})"
            )));
        }
        Ok(())
    }
}

/// Outcome of a remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The task existed and was deleted.
    Removed,
    /// There was no task to delete.
    NotPresent,
}

/// `schtasks` arguments that create the monthly task.
///
/// `command` is the executable path; `extra_args` are appended verbatim to
/// the task's command line.
#[must_use]
pub fn create_task_args(command: &str, extra_args: &str, schedule: &MonthlySchedule) -> Vec<String> {
    let task_run = format!("\"{command}\" {extra_args}").trim().to_string();
    let day = match schedule.day {
        ScheduleDay::LastDay => "LASTDAY".to_string(),
        ScheduleDay::Day(day) => day.to_string(),
    };
    let start_time = format!("{:02}:{:02}", schedule.hour, schedule.minute);

    [
        "/Create",
        "/TN",
        TASK_NAME,
        "/TR",
        task_run.as_str(),
        "/RL",
        "HIGHEST",
        "/F",
        "/SC",
        "MONTHLY",
        "/ST",
        start_time.as_str(),
        "/D",
        day.as_str(),
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// `schtasks` arguments that query the task.
#[must_use]
pub fn query_task_args() -> Vec<String> {
    ["/Query", "/TN", TASK_NAME].iter().map(ToString::to_string).collect()
}

/// `schtasks` arguments that delete the task.
#[must_use]
pub fn delete_task_args() -> Vec<String> {
    ["/Delete", "/TN", TASK_NAME, "/F"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Returns whether the scheduled task exists.
///
/// # Errors
///
/// Returns [`ScheduleError::Unsupported`] off Windows, or
/// [`ScheduleError::Spawn`] when `schtasks` cannot be started.
pub fn task_exists() -> Result<bool, ScheduleError> {
    ensure_supported()?;
    let output = Command::new("schtasks")
        .args(query_task_args())
        .output()
        .map_err(ScheduleError::Spawn)?;
    Ok(output.status.success())
}

/// Creates the monthly task, replacing an existing one.
///
/// # Errors
///
/// Returns [`ScheduleError`] when the schedule is invalid, the platform is
/// unsupported, or `schtasks` fails.
pub fn install(command: &str, extra_args: &str, schedule: &MonthlySchedule) -> Result<String, ScheduleError> {
    schedule.validate()?;
    ensure_supported()?;

    if task_exists()? {
        debug!("replacing existing scheduled task");
        run_schtasks(&delete_task_args())?;
    }
    let stdout = run_schtasks(&create_task_args(command, extra_args, schedule))?;
    info!(task = TASK_NAME, ?schedule, "scheduled task installed");
    Ok(stdout)
}

/// Deletes the task when present.
///
/// # Errors
///
/// Returns [`ScheduleError`] when the platform is unsupported or `schtasks`
/// fails.
pub fn remove() -> Result<RemoveOutcome, ScheduleError> {
    ensure_supported()?;
    if !task_exists()? {
        return Ok(RemoveOutcome::NotPresent);
    }
    run_schtasks(&delete_task_args())?;
    info!(task = TASK_NAME, "scheduled task removed");
    Ok(RemoveOutcome::Removed)
}

fn ensure_supported() -> Result<(), ScheduleError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(ScheduleError::Unsupported)
    }
}

fn run_schtasks(args: &[String]) -> Result<String, ScheduleError> {
    let output = Command::new("schtasks")
        .args(args)
        .output()
        .map_err(ScheduleError::Spawn)?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(ScheduleError::Failed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_args_last_day() {
        let args = create_task_args(
            r"C:\Tools\dmw-export.exe",
            "--prev-month",
            &MonthlySchedule::default(),
        );
        assert_eq!(args, vec![
            "/Create",
            "/TN",
            "DMW Monthly Export",
            "/TR",
            r#""C:\Tools\dmw-export.exe" --prev-month"#,
            "/RL",
            "HIGHEST",
            "/F",
            "/SC",
            "MONTHLY",
            "/ST",
            "23:55",
            "/D",
            "LASTDAY",
        ]);
    }

    #[test]
    fn test_create_args_fixed_day_and_no_extra_args() {
        let schedule = MonthlySchedule {
            hour: 6,
            minute: 5,
            day: ScheduleDay::Day(1),
        };
        let args = create_task_args("dmw-export", "", &schedule);
        assert_eq!(args[4], "\"dmw-export\"");
        assert_eq!(args[11], "06:05");
        assert_eq!(args[13], "1");
    }

    #[test]
    fn test_validate_ranges() {
        assert!(MonthlySchedule::default().validate().is_ok());
        let bad = [
            MonthlySchedule { hour: 24, ..MonthlySchedule::default() },
            MonthlySchedule { minute: 60, ..MonthlySchedule::default() },
            MonthlySchedule { day: ScheduleDay::Day(0), ..MonthlySchedule::default() },
            MonthlySchedule { day: ScheduleDay::Day(28), ..MonthlySchedule::default() },
        ];
        for schedule in bad {
            assert!(
                matches!(schedule.validate(), Err(ScheduleError::Invalid(_))),
                "{schedule:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_query_and_delete_args() {
        assert_eq!(query_task_args(), vec!["/Query", "/TN", TASK_NAME]);
        assert_eq!(delete_task_args(), vec!["/Delete", "/TN", TASK_NAME, "/F"]);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unsupported_off_windows() {
        assert!(matches!(task_exists(), Err(ScheduleError::Unsupported)));
        assert!(matches!(remove(), Err(ScheduleError::Unsupported)));
        assert!(matches!(
            install("x", "", &MonthlySchedule::default()),
            Err(ScheduleError::Unsupported)
        ));
    }
}
