//! Tracing setup: stderr plus a per-run log file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Subdirectory of the log dir holding run logs.
pub(crate) const LOG_SUBDIR: &str = "logs";

/// Keeps the log file writer alive; dropping it flushes pending lines.
#[derive(Debug)]
pub(crate) struct LogHandle {
    path: PathBuf,
    _guard: WorkerGuard,
}

impl LogHandle {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

/// `logs/run_<YYYY-MM-DD_HH-MM-SS>.log` under `log_dir`.
pub(crate) fn run_log_path(log_dir: &Path, stamp: &chrono::DateTime<Local>) -> PathBuf {
    log_dir
        .join(LOG_SUBDIR)
        .join(format!("run_{}.log", stamp.format("%Y-%m-%d_%H-%M-%S")))
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. Console output goes to stderr with
/// colors unless `no_color`; the file never carries ANSI codes.
pub(crate) fn init(log_dir: &Path, default_level: &str, no_color: bool) -> Result<LogHandle> {
    let path = run_log_path(log_dir, &Local::now());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, repeated calls) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!no_color),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init();

    Ok(LogHandle { path, _guard: guard })
}

/// Console-only subscriber for commands that do not export.
pub(crate) fn init_console(default_level: &str, no_color: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

/// Default filter directive for the given verbosity flags.
pub(crate) fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
