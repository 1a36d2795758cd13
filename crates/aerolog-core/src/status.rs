//! Recorder status snapshots for concurrent readers.
//!
//! The tracker is owned by the tick loop and never shared. Readers such as a
//! console or a dashboard instead read a [`RecorderStatus`] published by the
//! [`StatusBoard`] callback after every tick. The snapshot is replaced whole,
//! so a reader sees either the previous tick's status or the current one.

use std::collections::BTreeMap;
use std::sync::Arc;

use aerolog_types::{EntityId, LogKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::runner::TickCallback;
use crate::scheduler::{TelemetryScheduler, TickSummary};

/// Running totals since the recorder started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecorderTotals {
    /// Departure records produced.
    pub departures: u64,
    /// Conflict records produced.
    pub conflicts: u64,
    /// Loss-of-separation records produced.
    pub separations: u64,
    /// Loss-of-separation pairs skipped.
    pub skipped_pairs: u64,
    /// Rows written to enabled logs.
    pub rows_written: u64,
}

impl RecorderTotals {
    fn add(&mut self, summary: &TickSummary) {
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        self.departures = self.departures.saturating_add(count(summary.departed.len()));
        self.conflicts = self.conflicts.saturating_add(count(summary.conflicts));
        self.separations = self.separations.saturating_add(count(summary.separations));
        self.skipped_pairs = self.skipped_pairs.saturating_add(count(summary.skipped_pairs));
        self.rows_written = self.rows_written.saturating_add(count(summary.rows_written));
    }
}

/// Point-in-time view of the recorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecorderStatus {
    /// Last completed update, 0 before the first one.
    pub tick: u64,
    /// Simulation time of the last update.
    pub sim_time: f64,
    /// Entities active after the last update, in host order.
    pub active: Vec<EntityId>,
    /// Whether each log is recording, keyed by log name.
    pub logs_enabled: BTreeMap<&'static str, bool>,
    /// Totals since start.
    pub totals: RecorderTotals,
    /// Wall-clock time the snapshot was taken.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Cloneable read handle on the published status.
#[derive(Debug, Clone)]
pub struct StatusReader {
    snapshot: Arc<RwLock<RecorderStatus>>,
}

impl StatusReader {
    /// A copy of the latest published status.
    pub async fn snapshot(&self) -> RecorderStatus {
        self.snapshot.read().await.clone()
    }
}

/// Tick callback that publishes a [`RecorderStatus`] after every update.
#[derive(Debug, Default)]
pub struct StatusBoard {
    snapshot: Arc<RwLock<RecorderStatus>>,
    totals: RecorderTotals,
}

impl StatusBoard {
    /// Create a board with an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read handle that can be moved to other tasks.
    pub fn reader(&self) -> StatusReader {
        StatusReader {
            snapshot: Arc::clone(&self.snapshot),
        }
    }

    /// Totals accumulated so far, including ticks whose snapshot was
    /// skipped.
    pub const fn totals(&self) -> RecorderTotals {
        self.totals
    }
}

impl TickCallback for StatusBoard {
    fn on_tick(&mut self, summary: &TickSummary, scheduler: &TelemetryScheduler) {
        self.totals.add(summary);

        let status = RecorderStatus {
            tick: summary.tick,
            sim_time: summary.sim_time,
            active: scheduler.tracker().active_ids().to_vec(),
            logs_enabled: LogKind::ALL
                .iter()
                .map(|kind| (kind.name(), scheduler.logs().is_enabled(*kind)))
                .collect(),
            totals: self.totals,
            updated_at: Some(Utc::now()),
        };

        // Never block the tick loop on a reader; the next tick catches up.
        if let Ok(mut snapshot) = self.snapshot.try_write() {
            *snapshot = status;
        } else {
            debug!(tick = summary.tick, "Status snapshot busy, skipped");
        }
    }
}
