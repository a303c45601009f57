//! Persisted JSON configuration.
//!
//! The config file is a flat JSON object. Absent keys take their defaults and
//! unknown keys are ignored, so files written by older versions keep loading.
//! The API key can be supplied through `DMW_API_KEY` instead of the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::export::ExportFormat;
use crate::fetch::{
    DEFAULT_POLITE_DELAY, DEFAULT_TIMEOUT_SECS, TransportProfile, TransportSettings,
    parse_api_base,
};

/// Default API endpoint.
pub const DEFAULT_API_BASE: &str =
    "https://master-api.dmw.gov.ph/api/v1/public/approved-job-orders/filter";

/// Default jobsite (country) queried.
pub const DEFAULT_JOBSITE: &str = "Czech republic";

/// Default output directory, relative to the config location.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default timezone label.
pub const DEFAULT_TIMEZONE: &str = "Europe/Prague";

/// Environment variable overriding `api_key`.
pub const API_KEY_ENV: &str = "DMW_API_KEY";

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_POLITE_DELAY_MS: u64 = 60_000;

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has wrongly typed values.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is outside its accepted range.
    #[error("invalid config value for `{key}`: {message}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The config file could not be written.
    #[error("failed to write config file {path}: {source}")]
    Write {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Effective application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API endpoint.
    pub api_base: String,
    /// Static API key; empty means no key header.
    pub api_key: String,
    /// Jobsite (country) to export.
    pub jobsite: String,
    /// Directory receiving export files.
    pub output_dir: PathBuf,
    /// Raw format labels; see [`AppConfig::export_formats`].
    pub formats: Vec<String>,
    /// Operator timezone. Informational only.
    pub timezone: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pause between page requests in milliseconds.
    pub polite_delay_ms: u64,
    /// Transport header profile.
    pub transport: TransportProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            jobsite: DEFAULT_JOBSITE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: vec![ExportFormat::Csv.to_string()],
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            polite_delay_ms: u64::try_from(DEFAULT_POLITE_DELAY.as_millis()).unwrap_or(300),
            transport: TransportProfile::Browser,
        }
    }
}

impl AppConfig {
    /// Parses a JSON document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or mistyped values.
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_api_base(&self.api_base).map_err(|_| {
            ConfigError::invalid(
                "api_base",
                format!("'{}' is not an http(s) URL", self.api_base),
            )
        })?;

        if self.jobsite.trim().is_empty() {
            return Err(ConfigError::invalid("jobsite", "must not be empty"));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::invalid(
                "timeout_secs",
                format!("{}. Expected range: 1..={MAX_TIMEOUT_SECS}", self.timeout_secs),
            ));
        }
        if self.polite_delay_ms > MAX_POLITE_DELAY_MS {
            return Err(ConfigError::invalid(
                "polite_delay_ms",
                format!("{}. Expected range: 0..={MAX_POLITE_DELAY_MS}", self.polite_delay_ms),
            ));
        }
        Ok(())
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("API key taken from {API_KEY_ENV}");
            self.api_key = key;
        }
    }

    /// Anchors a relative `output_dir` to `base`.
    pub fn anchor_output_dir(&mut self, base: &Path) {
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
    }

    /// Normalized export formats (never empty).
    #[must_use]
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        ExportFormat::normalize_labels(&self.formats)
    }

    /// Pause between page requests.
    #[must_use]
    pub fn polite_delay(&self) -> Duration {
        Duration::from_millis(self.polite_delay_ms)
    }

    /// Settings for building the API transport.
    #[must_use]
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            api_base: self.api_base.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            profile: self.transport,
        }
    }

    /// API key with all but the last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        match chars.len() {
            0 => "<not set>".to_string(),
            n if n <= 4 => "*".repeat(n),
            n => {
                let tail: String = chars[n - 4..].iter().collect();
                format!("{}{tail}", "*".repeat(n - 4))
            }
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from this file.
    File(PathBuf),
    /// No file found; built-in defaults.
    Defaults,
}

/// Loaded configuration plus its origin.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Effective configuration.
    pub config: AppConfig,
    /// Origin of `config`.
    pub source: ConfigSource,
    /// Path that `config init` would write to.
    pub path: Option<PathBuf>,
}

/// Directory containing the running executable.
#[must_use]
pub fn executable_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Default config path: `config.json` next to the executable.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    executable_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads configuration.
///
/// An explicit `path` must exist. Without one, `config.json` next to the
/// executable is used when present, else the defaults. `DMW_API_KEY` is
/// applied last and the result is validated.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, or a value
/// is invalid.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let candidate = path.map(Path::to_path_buf).or_else(default_config_path);

    let loaded = match candidate {
        Some(file) if path.is_some() || file.exists() => {
            let config = load_from_path(&file, |name| env::var(name).ok())?;
            LoadedConfig {
                config,
                source: ConfigSource::File(file.clone()),
                path: Some(file),
            }
        }
        other => {
            let mut config = AppConfig::default();
            let base = executable_dir()
                .or_else(|| env::current_dir().ok())
                .unwrap_or_default();
            config.anchor_output_dir(&base);
            config.apply_env_overrides(|name| env::var(name).ok());
            config.validate()?;
            LoadedConfig {
                config,
                source: ConfigSource::Defaults,
                path: other,
            }
        }
    };

    info!(
        source = ?loaded.source,
        output_dir = %loaded.config.output_dir.display(),
        timezone = %loaded.config.timezone,
        "configuration loaded"
    );
    Ok(loaded)
}

/// Loads, anchors, overrides and validates a config file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, or a value
/// is invalid.
pub fn load_from_path<F>(path: &Path, env_lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = AppConfig::from_json_str(&raw, path)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.anchor_output_dir(base);
    config.apply_env_overrides(env_lookup);
    config.validate()?;
    Ok(config)
}

/// Writes `config` as pretty JSON, creating parent directories.
///
/// Format labels are stored normalized.
///
/// # Errors
///
/// Returns [`ConfigError`] when serialization or the write fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let mut to_save = config.clone();
    to_save.formats = config
        .export_formats()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut json = serde_json::to_string_pretty(&to_save)?;
    json.push('\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
