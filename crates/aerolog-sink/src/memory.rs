//! In-memory log sink.
//!
//! [`MemoryLog`] keeps rows in a shared buffer. The sink itself is boxed
//! into a [`LogSet`](crate::LogSet); a [`MemoryLogHandle`] cloned beforehand
//! lets tests and embedding hosts read the rows back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aerolog_types::{Field, LogKind};

use crate::error::SinkError;
use crate::sink::{LogSink, format_row};

/// A row captured by a [`MemoryLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedRow {
    /// Sink-assigned simulation time.
    pub sim_time: f64,
    /// The record's columns.
    pub fields: Vec<Field>,
}

impl LoggedRow {
    /// The row as it would appear in a log file.
    pub fn rendered(&self) -> String {
        format_row(self.sim_time, &self.fields)
    }

    /// The column at `index`, rendered as text.
    pub fn column(&self, index: usize) -> Option<String> {
        self.fields.get(index).map(ToString::to_string)
    }
}

#[derive(Debug, Default)]
struct Shared {
    enabled: bool,
    enable_calls: u32,
    rows: Vec<LoggedRow>,
}

/// Read access to the rows of a [`MemoryLog`].
#[derive(Debug, Clone)]
pub struct MemoryLogHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryLogHandle {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of every row recorded so far.
    pub fn rows(&self) -> Vec<LoggedRow> {
        self.lock().rows.clone()
    }

    /// Number of rows recorded so far.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether no rows have been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Whether the sink is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// How many times the sink was asked to switch on.
    pub fn enable_calls(&self) -> u32 {
        self.lock().enable_calls
    }
}

/// A log sink that records rows in memory.
#[derive(Debug)]
pub struct MemoryLog {
    kind: LogKind,
    shared: Arc<Mutex<Shared>>,
}

impl MemoryLog {
    /// Create a disabled in-memory log.
    pub fn new(kind: LogKind) -> Self {
        Self {
            kind,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Create an in-memory log that starts enabled.
    pub fn enabled(kind: LogKind) -> Self {
        let log = Self::new(kind);
        log.lock().enabled = true;
        log
    }

    /// A handle for reading the rows after the sink has been boxed.
    pub fn handle(&self) -> MemoryLogHandle {
        MemoryLogHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemoryLog {
    fn kind(&self) -> LogKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        let mut shared = self.lock();
        if enabled {
            shared.enable_calls = shared.enable_calls.saturating_add(1);
        }
        shared.enabled = enabled;
        Ok(())
    }

    fn write_row(&mut self, sim_time: f64, fields: &[Field]) -> Result<bool, SinkError> {
        let mut shared = self.lock();
        if !shared.enabled {
            return Ok(false);
        }
        shared.rows.push(LoggedRow {
            sim_time,
            fields: fields.to_vec(),
        });
        Ok(true)
    }
}
