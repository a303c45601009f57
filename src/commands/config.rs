//! Config command handlers: show and init.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use dmw_export_core::config::{AppConfig, ConfigSource, LoadedConfig, default_config_path};
use dmw_export_core::save_config;

/// `key = value` lines describing the effective configuration.
pub(crate) fn describe_config(loaded: &LoadedConfig) -> Vec<String> {
    let config = &loaded.config;
    let source = match &loaded.source {
        ConfigSource::File(path) => format!("loaded from {}", path.display()),
        ConfigSource::Defaults => "not found (using defaults)".to_string(),
    };
    let path = loaded
        .path
        .as_ref()
        .map_or_else(|| "<unresolved>".to_string(), |p| p.display().to_string());
    let formats: Vec<String> = config
        .export_formats()
        .iter()
        .map(ToString::to_string)
        .collect();

    vec![
        format!("config_path = {path}"),
        format!("config_file = {source}"),
        format!("api_base = {}", config.api_base),
        format!("api_key = {}", config.masked_api_key()),
        format!("jobsite = {}", config.jobsite),
        format!("output_dir = {}", config.output_dir.display()),
        format!("formats = {}", formats.join(",")),
        format!("timezone = {}", config.timezone),
        format!("timeout_secs = {}", config.timeout_secs),
        format!("polite_delay_ms = {}", config.polite_delay_ms),
        format!("transport = {}", config.transport.as_str()),
    ]
}

pub(crate) fn run_config_show_command(loaded: &LoadedConfig) {
    for line in describe_config(loaded) {
        println!("{line}");
    }
}

/// Writes a default config file, refusing to overwrite unless `force`.
pub(crate) fn run_config_init_command(explicit: Option<&Path>, force: bool) -> Result<PathBuf> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_config_path) else {
        bail!("cannot determine where to write the config file; pass --config");
    };
    if path.exists() && !force {
        bail!(
            "config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    save_config(&path, &AppConfig::default())?;
    println!("Wrote config: {}", path.display());
    Ok(path)
}
