//! Recorder binary for Aerolog.
//!
//! This is the main entry point that wires a traffic host to the telemetry
//! recorder. It loads configuration, builds the file-backed logs, selects a
//! frame source, and runs the recorder loop until the source is exhausted,
//! the tick limit is reached, or the operator presses Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `aerolog-config.yaml` (or `AEROLOG_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the file logs and the telemetry scheduler
//! 4. Run `TELEMETRY ON` if `logs.enable_on_start` is set
//! 5. Select the frame source: replay trace or synthetic host
//! 6. Attach the stdin console and the Ctrl-C handler
//! 7. Run the recorder loop
//! 8. Flush the logs and log the result

mod console;
mod error;
mod replay;
mod synthetic;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use aerolog_core::command;
use aerolog_core::config::{ConfigError, RecorderConfig};
use aerolog_core::proximity::ProximityLogger;
use aerolog_core::runner::{self, FrameSource, RunControl};
use aerolog_core::scheduler::TelemetryScheduler;
use aerolog_core::status::StatusBoard;
use aerolog_sink::LogSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleSource;
use crate::error::EngineError;
use crate::replay::ReplaySource;
use crate::synthetic::{SyntheticConfig, SyntheticHost};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "AEROLOG_CONFIG";

/// Configuration file used when `AEROLOG_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "aerolog-config.yaml";

/// Application entry point for the recorder.
///
/// # Errors
///
/// Returns an error if any initialization step or the recorder run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("aerolog starting");
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        update_interval_secs = config.recorder.update_interval_secs,
        max_ticks = config.recorder.max_ticks,
        realtime = config.recorder.realtime,
        output_dir = %config.logs.output_dir.display(),
        deduplicate = config.proximity.deduplicate,
        "Configuration loaded"
    );

    // 3. Build logs and scheduler.
    let logs = LogSet::files(&config.logs.output_dir);
    let proximity = if config.proximity.deduplicate {
        ProximityLogger::deduplicating()
    } else {
        ProximityLogger::new()
    };
    let mut scheduler = TelemetryScheduler::new(logs, proximity);

    // 4. Enable logging on start.
    if config.logs.enable_on_start {
        let outcome = command::execute(scheduler.logs_mut(), "ON");
        if !outcome.success {
            return Err(EngineError::Command {
                message: outcome.message,
            }
            .into());
        }
        info!(reply = %outcome.message, "Telemetry enabled on start");
    }

    // 5. Select the frame source.
    let inner: Box<dyn FrameSource> = if let Some(trace) = &config.replay.trace_path {
        Box::new(ReplaySource::open(trace).map_err(EngineError::from)?)
    } else {
        let synthetic = load_synthetic_config(&config_path)?;
        Box::new(SyntheticHost::new(
            synthetic,
            config.recorder.update_interval_secs,
        ))
    };

    // 6. Console and Ctrl-C.
    let mut source = ConsoleSource::new(inner, console::spawn_stdin_reader());
    let interval = Duration::try_from_secs_f64(config.recorder.update_interval_secs).map_err(
        |e| EngineError::from(ConfigError::Invalid {
            field: "recorder.update_interval_secs",
            reason: e.to_string(),
        }),
    )?;
    let control = Arc::new(RunControl::new(
        config.recorder.max_ticks,
        interval,
        config.recorder.realtime,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current update");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 7. Run the recorder.
    let mut board = StatusBoard::new();
    let result = runner::run_recorder(&mut scheduler, &mut source, &control, &mut board).await;

    // 8. Flush and log results, even when the run failed.
    scheduler
        .logs_mut()
        .flush_all()
        .map_err(EngineError::from)?;
    let result = result.map_err(EngineError::from)?;
    runner::log_run_end(&result);

    let totals = board.totals();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        departures = totals.departures,
        conflicts = totals.conflicts,
        separations = totals.separations,
        skipped_pairs = totals.skipped_pairs,
        rows_written = totals.rows_written,
        "aerolog shutdown complete"
    );

    Ok(())
}

/// The configuration file path, from `AEROLOG_CONFIG` or the default.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the recorder configuration.
///
/// A missing file yields the defaults, with environment overrides applied.
fn load_config(path: &Path) -> Result<RecorderConfig, EngineError> {
    if path.exists() {
        Ok(RecorderConfig::from_file(path)?)
    } else {
        let mut config = RecorderConfig::default();
        config.logs.apply_env_overrides();
        Ok(config)
    }
}

/// Load the synthetic host configuration.
///
/// Reads the `synthetic` section from the YAML config file. If the file
/// does not exist or lacks the `synthetic` key, defaults are used.
fn load_synthetic_config(path: &Path) -> Result<SyntheticConfig, EngineError> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Synthetic {
            message: format!("failed to read config file: {e}"),
        })?;

        // Parse the full YAML and extract just the "synthetic" section.
        let raw: serde_yml::Value =
            serde_yml::from_str(&contents).map_err(|e| EngineError::Synthetic {
                message: format!("failed to parse config YAML: {e}"),
            })?;

        match raw.get("synthetic") {
            Some(section) => serde_yml::from_value(section.clone()).map_err(|e| {
                EngineError::Synthetic {
                    message: format!("failed to parse synthetic config: {e}"),
                }
            })?,
            None => SyntheticConfig::default(),
        }
    } else {
        SyntheticConfig::default()
    };

    config
        .validate()
        .map_err(|message| EngineError::Synthetic { message })?;
    info!(
        seed = config.seed,
        max_entities = config.max_entities,
        spawn_probability = config.spawn_probability,
        "Synthetic host configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn synthetic_section_is_read_from_the_shared_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "recorder:\n  update_interval_secs: 2.0\nsynthetic:\n  seed: 9\n  max_entities: 3"
        )
        .unwrap();

        let synthetic = load_synthetic_config(file.path()).unwrap();
        assert_eq!(synthetic.seed, 9);
        assert_eq!(synthetic.max_entities, 3);

        let recorder = load_config(file.path()).unwrap();
        assert!((recorder.recorder.update_interval_secs - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert_eq!(load_synthetic_config(&path).unwrap(), SyntheticConfig::default());
        assert!(load_config(&path).unwrap().recorder.realtime);
    }

    #[test]
    fn invalid_synthetic_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "synthetic:\n  spawn_probability: 2.0").unwrap();
        let err = load_synthetic_config(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::Synthetic { .. }));
    }

    #[tokio::test]
    async fn synthetic_run_writes_log_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler =
            TelemetryScheduler::new(LogSet::files(dir.path()), ProximityLogger::new());
        assert!(command::execute(scheduler.logs_mut(), "ON").success);

        let config = SyntheticConfig {
            spawn_probability: 1.0,
            max_entities: 6,
            area_radius_m: 300.0,
            speed_mps: 30.0,
            ..SyntheticConfig::default()
        };
        let mut source = SyntheticHost::new(config, 1.0);
        let control = Arc::new(RunControl::new(200, Duration::from_secs(1), false));
        let mut board = StatusBoard::new();

        let result = runner::run_recorder(&mut scheduler, &mut source, &control, &mut board)
            .await
            .unwrap();
        scheduler.logs_mut().flush_all().unwrap();

        assert_eq!(result.total_ticks, 200);
        assert!(board.totals().departures > 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
