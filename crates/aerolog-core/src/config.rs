//! Configuration loading and typed config structures for the recorder.
//!
//! The canonical configuration lives in `aerolog-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads and validates the file. Every field has a
//! default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable that overrides `logs.output_dir`.
pub const OUTPUT_DIR_ENV: &str = "AEROLOG_OUTPUT_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but a value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level recorder configuration.
///
/// Mirrors the structure of `aerolog-config.yaml`. Unknown top-level
/// sections (such as the engine's `synthetic` block) are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecorderConfig {
    /// Update cadence and run bounds.
    #[serde(default)]
    pub recorder: RecorderSection,

    /// Log file settings.
    #[serde(default)]
    pub logs: LogsConfig,

    /// Conflict and loss-of-separation handling.
    #[serde(default)]
    pub proximity: ProximityConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Trace replay settings.
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl RecorderConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `AEROLOG_OUTPUT_DIR` overrides `logs.output_dir` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.logs.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.recorder.update_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "recorder.update_interval_secs",
                reason: format!("must be a positive number of seconds, got {interval}"),
            });
        }
        Ok(())
    }
}

/// Update cadence and run bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecorderSection {
    /// Seconds between telemetry updates.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: f64,

    /// Stop after this many updates (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Sleep one interval of wall-clock time between updates.
    #[serde(default = "default_true")]
    pub realtime: bool,
}

impl Default for RecorderSection {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            max_ticks: 0,
            realtime: default_true(),
        }
    }
}

/// Log file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogsConfig {
    /// Directory that receives the log files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Run `TELEMETRY ON` before the first update.
    #[serde(default)]
    pub enable_on_start: bool,
}

impl LogsConfig {
    /// Override the output directory with `AEROLOG_OUTPUT_DIR` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = std::env::var_os(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(val);
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            enable_on_start: false,
        }
    }
}

/// Conflict and loss-of-separation handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProximityConfig {
    /// Log a pair only on the tick it opens, for hosts that re-report
    /// ongoing events.
    #[serde(default)]
    pub deduplicate: bool,
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Trace replay settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
    /// JSON-lines trace of frames to replay instead of the synthetic host.
    #[serde(default)]
    pub trace_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_update_interval_secs() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_log_level() -> String {
    String::from("info")
}
