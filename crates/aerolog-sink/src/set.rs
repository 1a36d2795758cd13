//! The three recorder logs, owned together.
//!
//! [`LogSet`] is the single sink the recorder talks to. It holds one
//! [`LogSink`] per [`LogKind`], assigns the current simulation time to every
//! row, and routes records to the log they belong to.

use std::path::Path;

use aerolog_types::{LogKind, LogRecord};
use tracing::info;

use crate::error::SinkError;
use crate::file::FileLog;
use crate::memory::{MemoryLog, MemoryLogHandle};
use crate::sink::LogSink;

/// Read handles for a [`LogSet`] built with [`LogSet::in_memory`].
#[derive(Debug, Clone)]
pub struct MemoryLogs {
    /// Rows of `UAV_LOG`.
    pub uav: MemoryLogHandle,
    /// Rows of `CONFLICT_LOG`.
    pub conflict: MemoryLogHandle,
    /// Rows of `LOSS_OF_SEPARATION_LOG`.
    pub separation: MemoryLogHandle,
}

impl MemoryLogs {
    /// The handle for a given log.
    pub const fn get(&self, kind: LogKind) -> &MemoryLogHandle {
        match kind {
            LogKind::Uav => &self.uav,
            LogKind::Conflict => &self.conflict,
            LogKind::LossOfSeparation => &self.separation,
        }
    }
}

/// The departure, conflict and loss-of-separation logs.
pub struct LogSet {
    uav: Box<dyn LogSink>,
    conflict: Box<dyn LogSink>,
    separation: Box<dyn LogSink>,
    sim_time: f64,
}

impl core::fmt::Debug for LogSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LogSet")
            .field("uav_enabled", &self.uav.is_enabled())
            .field("conflict_enabled", &self.conflict.is_enabled())
            .field("separation_enabled", &self.separation.is_enabled())
            .field("sim_time", &self.sim_time)
            .finish()
    }
}

impl LogSet {
    /// Assemble a log set from one sink per log.
    pub fn new(
        uav: Box<dyn LogSink>,
        conflict: Box<dyn LogSink>,
        separation: Box<dyn LogSink>,
    ) -> Self {
        debug_assert_eq!(uav.kind(), LogKind::Uav);
        debug_assert_eq!(conflict.kind(), LogKind::Conflict);
        debug_assert_eq!(separation.kind(), LogKind::LossOfSeparation);
        Self {
            uav,
            conflict,
            separation,
            sim_time: 0.0,
        }
    }

    /// File-backed logs writing into `output_dir`, all initially disabled.
    pub fn files(output_dir: &Path) -> Self {
        Self::new(
            Box::new(FileLog::new(LogKind::Uav, output_dir)),
            Box::new(FileLog::new(LogKind::Conflict, output_dir)),
            Box::new(FileLog::new(LogKind::LossOfSeparation, output_dir)),
        )
    }

    /// In-memory logs plus handles to read them back.
    ///
    /// With `enabled` set, every log starts switched on.
    pub fn in_memory(enabled: bool) -> (Self, MemoryLogs) {
        let make = |kind| {
            if enabled {
                MemoryLog::enabled(kind)
            } else {
                MemoryLog::new(kind)
            }
        };
        let uav = make(LogKind::Uav);
        let conflict = make(LogKind::Conflict);
        let separation = make(LogKind::LossOfSeparation);
        let handles = MemoryLogs {
            uav: uav.handle(),
            conflict: conflict.handle(),
            separation: separation.handle(),
        };
        (
            Self::new(Box::new(uav), Box::new(conflict), Box::new(separation)),
            handles,
        )
    }

    fn sink(&self, kind: LogKind) -> &dyn LogSink {
        match kind {
            LogKind::Uav => self.uav.as_ref(),
            LogKind::Conflict => self.conflict.as_ref(),
            LogKind::LossOfSeparation => self.separation.as_ref(),
        }
    }

    fn sink_mut(&mut self, kind: LogKind) -> &mut dyn LogSink {
        match kind {
            LogKind::Uav => self.uav.as_mut(),
            LogKind::Conflict => self.conflict.as_mut(),
            LogKind::LossOfSeparation => self.separation.as_mut(),
        }
    }

    /// Set the timestamp stamped on subsequent rows.
    pub const fn set_sim_time(&mut self, sim_time: f64) {
        self.sim_time = sim_time;
    }

    /// The timestamp currently stamped on rows.
    pub const fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Append a record to the log it belongs to.
    ///
    /// Returns `Ok(false)` when that log is disabled and the row was dropped.
    pub fn write(&mut self, record: &dyn LogRecord) -> Result<bool, SinkError> {
        let sim_time = self.sim_time;
        let fields = record.fields();
        self.sink_mut(record.kind()).write_row(sim_time, &fields)
    }

    /// Whether a log is currently recording.
    pub fn is_enabled(&self, kind: LogKind) -> bool {
        self.sink(kind).is_enabled()
    }

    /// Switch a log on.
    pub fn enable(&mut self, kind: LogKind) -> Result<(), SinkError> {
        self.sink_mut(kind).set_enabled(true)?;
        info!(logger = kind.name(), "Logger enabled");
        Ok(())
    }

    /// Switch a log off, flushing it first.
    pub fn disable(&mut self, kind: LogKind) -> Result<(), SinkError> {
        self.sink_mut(kind).set_enabled(false)?;
        info!(logger = kind.name(), "Logger disabled");
        Ok(())
    }

    /// Flush every log.
    pub fn flush_all(&mut self) -> Result<(), SinkError> {
        for kind in LogKind::ALL {
            self.sink_mut(kind).flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aerolog_types::{ConflictRecord, DepartureRecord, EntityId, SeparationRecord};

    use super::*;

    #[test]
    fn records_are_routed_by_kind_and_stamped() {
        let (mut logs, handles) = LogSet::in_memory(true);
        logs.set_sim_time(7.0);

        logs.write(&DepartureRecord {
            id: EntityId::from("A"),
            distance_flown_m: 100.0,
            remaining_m: None,
        })
        .unwrap();
        logs.write(&ConflictRecord {
            first: EntityId::from("A"),
            second: EntityId::from("B"),
        })
        .unwrap();
        logs.set_sim_time(8.0);
        logs.write(&SeparationRecord {
            first: EntityId::from("A"),
            second: EntityId::from("B"),
            distance_m: 12.0,
        })
        .unwrap();

        assert_eq!(handles.uav.len(), 1);
        assert_eq!(handles.conflict.len(), 1);
        let separation = handles.separation.rows();
        assert_eq!(separation.len(), 1);
        assert!((separation.first().unwrap().sim_time - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_log_reports_dropped_row() {
        let (mut logs, handles) = LogSet::in_memory(false);
        let written = logs
            .write(&ConflictRecord {
                first: EntityId::from("A"),
                second: EntityId::from("B"),
            })
            .unwrap();
        assert!(!written);
        assert!(handles.conflict.is_empty());
    }

    #[test]
    fn enable_and_disable_toggle_individual_logs() {
        let (mut logs, handles) = LogSet::in_memory(false);
        logs.enable(LogKind::Conflict).unwrap();
        assert!(logs.is_enabled(LogKind::Conflict));
        assert!(!logs.is_enabled(LogKind::Uav));
        assert!(handles.get(LogKind::Conflict).is_enabled());

        logs.disable(LogKind::Conflict).unwrap();
        assert!(!logs.is_enabled(LogKind::Conflict));
    }
}
