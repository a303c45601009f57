//! CLI command handlers.

mod config;
mod export;
mod schedule;

pub(crate) use config::{run_config_init_command, run_config_show_command};
pub(crate) use export::run_export_command;
pub(crate) use schedule::run_schedule_command;
