//! CLI entry point for the DMW job-order exporter.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use dmw_export_core::load_config;
use tracing::{debug, error, info};

mod app;
mod cli;
mod commands;

use app::{logging, terminal};
use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let no_color = terminal::should_disable_color(
        terminal::no_color_env_requested(),
        terminal::is_dumb_terminal(),
    );
    let default_level = logging::default_level(cli.verbose, cli.quiet);

    match &cli.command {
        Some(Command::Config { command }) => {
            logging::init_console(default_level, no_color);
            match command {
                ConfigCommand::Show => {
                    let loaded = load_config(cli.config.as_deref())?;
                    commands::run_config_show_command(&loaded);
                }
                ConfigCommand::Init { force } => {
                    commands::run_config_init_command(cli.config.as_deref(), *force)?;
                }
            }
            return Ok(());
        }
        Some(Command::Schedule { command }) => {
            logging::init_console(default_level, no_color);
            commands::run_schedule_command(command)?;
            return Ok(());
        }
        None => {}
    }

    let log = logging::init(&cli.log_dir, default_level, no_color)?;
    debug!(?cli, "CLI arguments parsed");
    info!(log_file = %log.path().display(), "DMW export starting");

    let outcome = run(&cli).await;
    if let Err(err) = &outcome {
        error!("{err:#}");
    }
    drop(log);
    outcome
}

async fn run(cli: &Cli) -> Result<()> {
    // Config problems surface here, before any request is made.
    let loaded = load_config(cli.config.as_deref())?;

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    );
    let summary =
        commands::run_export_command(loaded.config, &cli.run, use_spinner, cli.quiet).await?;

    info!(
        rows = summary.rows,
        reported_total = summary.reported_total,
        files = summary.write.paths().len(),
        "done"
    );
    Ok(())
}
