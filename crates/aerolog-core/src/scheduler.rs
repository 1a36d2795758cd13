//! The per-tick telemetry update.
//!
//! [`TelemetryScheduler::update`] is invoked once per recorder interval. It
//! runs, in order:
//!
//! 1. **Lifecycle** -- refresh the [`EntityTracker`] and write one
//!    `UAV_LOG` row per departure.
//! 2. **Conflicts** -- one `CONFLICT_LOG` row per conflict pair.
//! 3. **Separations** -- one `LOSS_OF_SEPARATION_LOG` row per
//!    loss-of-separation pair.
//!
//! Every row is stamped with the host's simulation time for the tick. The
//! whole update completes before it returns; there are no suspension points.

use aerolog_sink::{LogSet, SinkError};
use aerolog_types::{EntityId, LogRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::host::TrafficView;
use crate::proximity::ProximityLogger;
use crate::tracker::{EntityTracker, TrackerError};

/// Errors that can occur during a telemetry update.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The lifecycle refresh failed; tracker state is unchanged.
    #[error("tracker error: {source}")]
    Tracker {
        /// The underlying tracker error.
        #[from]
        source: TrackerError,
    },

    /// Writing a row to one of the logs failed.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: SinkError,
    },
}

/// Summary of a single telemetry update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    /// Sequence number of the update, starting at 1.
    pub tick: u64,
    /// Host simulation time of the update, in seconds.
    pub sim_time: f64,
    /// Entities active after the update.
    pub active: usize,
    /// Entities that appeared this tick.
    pub arrived: Vec<EntityId>,
    /// Entities that disappeared this tick.
    pub departed: Vec<EntityId>,
    /// Conflict records produced.
    pub conflicts: usize,
    /// Loss-of-separation records produced.
    pub separations: usize,
    /// Loss-of-separation pairs skipped for lack of a member position.
    pub skipped_pairs: usize,
    /// Rows actually written; records for disabled logs are not counted.
    pub rows_written: usize,
}

/// Outcome of the writes attempted during one tick.
#[derive(Debug, Default)]
struct TickWrites {
    rows: usize,
    failed: usize,
    first_error: Option<SinkError>,
}

impl TickWrites {
    /// Write one record, remembering the first failure instead of stopping.
    fn write(&mut self, logs: &mut LogSet, record: &dyn LogRecord) {
        match logs.write(record) {
            Ok(written) => self.rows = self.rows.saturating_add(usize::from(written)),
            Err(e) => {
                self.failed = self.failed.saturating_add(1);
                warn!(
                    logger = record.kind().name(),
                    failed = self.failed,
                    error = %e,
                    "Log write failed"
                );
                if self.first_error.is_none() {
                    self.first_error = Some(e);
                }
            }
        }
    }
}

/// Owns the tracker, the proximity logger and the logs, and runs the
/// three telemetry phases once per tick.
#[derive(Debug)]
pub struct TelemetryScheduler {
    tracker: EntityTracker,
    proximity: ProximityLogger,
    logs: LogSet,
    ticks: u64,
}

impl TelemetryScheduler {
    /// Build a scheduler writing into `logs`.
    pub fn new(logs: LogSet, proximity: ProximityLogger) -> Self {
        Self {
            tracker: EntityTracker::new(),
            proximity,
            logs,
            ticks: 0,
        }
    }

    /// Run one telemetry update against the host's current state.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Tracker`] if the lifecycle refresh fails. Nothing
    /// is written in that case. Returns [`TickError::Sink`] with the first
    /// failed write once every row of the tick has been attempted; rows that
    /// succeeded stay written.
    pub fn update(&mut self, view: &dyn TrafficView) -> Result<TickSummary, TickError> {
        let sim_time = view.sim_time();
        let tick = self.ticks.saturating_add(1);

        // --- Lifecycle ---
        let refresh = self.tracker.refresh(view)?;
        self.ticks = tick;
        self.logs.set_sim_time(sim_time);

        let mut writes = TickWrites::default();
        let mut departed = Vec::with_capacity(refresh.departures.len());
        for record in &refresh.departures {
            writes.write(&mut self.logs, record);
            departed.push(record.id.clone());
        }

        // --- Proximity ---
        let proximity = self.proximity.process(view);
        for record in &proximity.conflicts {
            writes.write(&mut self.logs, record);
        }
        for record in &proximity.separations {
            writes.write(&mut self.logs, record);
        }
        if let Some(source) = writes.first_error {
            return Err(TickError::Sink { source });
        }
        let rows_written = writes.rows;

        let summary = TickSummary {
            tick,
            sim_time,
            active: self.tracker.active_count(),
            arrived: refresh.arrived,
            departed,
            conflicts: proximity.conflicts.len(),
            separations: proximity.separations.len(),
            skipped_pairs: proximity.skipped.len(),
            rows_written,
        };

        if summary.departed.is_empty() && summary.conflicts == 0 && summary.separations == 0 {
            debug!(tick, sim_time, active = summary.active, "Telemetry update");
        } else {
            info!(
                tick,
                sim_time,
                active = summary.active,
                departed = summary.departed.len(),
                conflicts = summary.conflicts,
                separations = summary.separations,
                rows_written,
                "Telemetry update"
            );
        }
        Ok(summary)
    }

    /// Number of updates completed so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The lifecycle tracker.
    pub const fn tracker(&self) -> &EntityTracker {
        &self.tracker
    }

    /// The logs, for status queries.
    pub const fn logs(&self) -> &LogSet {
        &self.logs
    }

    /// The logs, for console commands and shutdown flushing.
    pub const fn logs_mut(&mut self) -> &mut LogSet {
        &mut self.logs
    }
}
