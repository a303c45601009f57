//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dmw_export_core::ExportFormat;
use dmw_export_core::MonthStamp;
use dmw_export_core::schedule::{DEFAULT_HOUR, DEFAULT_MINUTE, MAX_FIXED_DAY};

/// Export approved job orders from the DMW public API.
///
/// Without a subcommand, fetches every page for the configured jobsite and
/// writes the result as CSV and/or XLSX.
#[derive(Parser, Debug)]
#[command(name = "dmw-export")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config.json (default: next to the executable)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving logs/run_<timestamp>.log
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options of an export run.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Month stamp used in output file names (YYYY-MM, default: current month)
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<MonthStamp>,

    /// Use the previous calendar month (overrides --month)
    #[arg(long)]
    pub prev_month: bool,

    /// Stop after this many pages (testing/debugging)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// Jobsite to export (overrides config)
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub jobsite: Option<String>,

    /// Output directory (overrides config)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format, repeatable (overrides config)
    #[arg(long = "format", value_name = "FORMAT")]
    pub formats: Vec<ExportFormat>,
}

impl RunArgs {
    /// Month stamp after applying `--prev-month`.
    pub fn effective_month(&self) -> Option<MonthStamp> {
        if self.prev_month {
            Some(MonthStamp::current().previous())
        } else {
            self.month
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Manage the monthly scheduled task (Windows)
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (API key masked)
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Create (or replace) the monthly task
    Install(ScheduleInstallArgs),
    /// Delete the monthly task
    Remove,
    /// Show whether the monthly task exists
    Status,
}

#[derive(Args, Debug, Clone)]
pub struct ScheduleInstallArgs {
    /// Hour of the run (0-23)
    #[arg(long, default_value_t = DEFAULT_HOUR, value_parser = clap::value_parser!(u8).range(0..=23))]
    pub hour: u8,

    /// Minute of the run (0-59)
    #[arg(long, default_value_t = DEFAULT_MINUTE, value_parser = clap::value_parser!(u8).range(0..=59))]
    pub minute: u8,

    /// Run on a fixed day of the month instead of the last day
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=i64::from(MAX_FIXED_DAY)))]
    pub day: Option<u8>,

    /// Extra arguments passed to the scheduled run
    #[arg(long = "args", value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
    pub extra_args: String,
}
