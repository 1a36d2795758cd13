//! Recorder loop with run controls.
//!
//! This module provides [`run_recorder`], the top-level async function that
//! pulls frames from a [`FrameSource`] and drives the
//! [`TelemetryScheduler`] with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` updates
//! - **Source exhaustion**: stop when a replay trace runs out
//! - **Clean stop**: a stop requested through [`RunControl`] ends the loop
//!   before the next update
//! - **Console commands**: command lines carried by a frame are executed
//!   before that frame's update
//!
//! [`TelemetryScheduler`]: crate::scheduler::TelemetryScheduler

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use aerolog_types::TrafficFrame;
use serde::Serialize;
use tracing::{info, warn};

use crate::command;
use crate::scheduler::{TelemetryScheduler, TickError, TickSummary};

/// Errors raised by a [`FrameSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading the underlying input failed.
    #[error("failed to read frames: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A frame could not be decoded.
    #[error("malformed frame on line {line}: {source}")]
    Decode {
        /// One-based line number of the frame.
        line: u64,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Errors that can occur during the recorder run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A telemetry update failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The frame source failed.
    #[error("source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },
}

/// Supplies the host state for each tick.
pub trait FrameSource: Send {
    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<TrafficFrame>, SourceError>;
}

impl FrameSource for std::vec::IntoIter<TrafficFrame> {
    fn next_frame(&mut self) -> Result<Option<TrafficFrame>, SourceError> {
        Ok(self.next())
    }
}

/// Callback invoked after each update completes.
///
/// Implementations can use this to publish status or forward summaries.
pub trait TickCallback: Send {
    /// Called after an update completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, scheduler: &TelemetryScheduler);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _scheduler: &TelemetryScheduler) {}
}

/// Reason why the recorder run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// The frame source has no more frames.
    SourceExhausted,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested through [`RunControl`].
    StopRequested,
}

/// Shared run control state.
///
/// Wrapped in [`Arc`] and shared between the recorder loop and whoever may
/// stop it, such as a Ctrl-C handler.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    max_ticks: u64,
    interval: Duration,
    realtime: bool,
}

impl RunControl {
    /// Create run controls.
    ///
    /// `max_ticks` of 0 means unlimited. In `realtime` mode the loop sleeps
    /// `interval` between updates.
    pub const fn new(max_ticks: u64, interval: Duration, realtime: bool) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            max_ticks,
            interval,
            realtime,
        }
    }

    /// Ask the loop to stop before its next update.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// The configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` has reached the tick limit.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }

    /// Wall-clock pause between updates, if any.
    pub const fn pause(&self) -> Option<Duration> {
        if self.realtime && !self.interval.is_zero() {
            Some(self.interval)
        } else {
            None
        }
    }
}

/// Result of the recorder run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// The last tick summary, if any update completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of updates executed.
    pub total_ticks: u64,
}

/// Run the recorder until the source is exhausted, the tick limit is
/// reached, or a stop is requested.
///
/// For each frame, its command lines are executed first, then the
/// scheduler update runs and `callback` is notified.
///
/// # Errors
///
/// Returns [`RunnerError`] if the source or an update fails. The logs are
/// left as they are; dropping the scheduler flushes them.
pub async fn run_recorder(
    scheduler: &mut TelemetryScheduler,
    source: &mut dyn FrameSource,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        pause_secs = control.pause().map(|d| d.as_secs_f64()),
        "Recorder starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(RunResult {
                end_reason: EndReason::StopRequested,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Next frame ---
        let Some(frame) = source.next_frame()? else {
            info!("Frame source exhausted");
            return Ok(RunResult {
                end_reason: EndReason::SourceExhausted,
                final_summary: last_summary,
                total_ticks,
            });
        };

        // --- Console commands ---
        for line in frame.commands() {
            match command::dispatch(scheduler.logs_mut(), line) {
                Some(outcome) if outcome.success => {
                    info!(command = %line, reply = %outcome.message, "Command executed");
                }
                Some(outcome) => {
                    warn!(command = %line, reply = %outcome.message, "Command failed");
                }
                None => warn!(command = %line, "Unknown command word"),
            }
        }

        // --- Update ---
        let summary = scheduler.update(&frame)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, scheduler);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(total_ticks) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(RunResult {
                end_reason: EndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for update interval ---
        if let Some(pause) = control.pause() {
            tokio::time::sleep(pause).await;
        }
    }
}

/// Log the end of a recorder run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_sim_time = result.final_summary.as_ref().map(|s| s.sim_time),
        final_active = result.final_summary.as_ref().map(|s| s.active),
        "Recorder ended"
    );
}
