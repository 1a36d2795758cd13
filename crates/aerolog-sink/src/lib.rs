//! Append-only log sinks for the Aerolog telemetry recorder.
//!
//! The recorder writes three named logs. Each is a [`LogSink`]: an
//! append-only table with a fixed header that records rows only while it is
//! enabled. [`LogSet`] bundles the three sinks, stamps every row with the
//! current simulation time, and routes records to their log.
//!
//! # Architecture
//!
//! ```text
//! TelemetryScheduler
//!     |
//!     +-- LogSet::write(record) --> UAV_LOG                 (FileLog | MemoryLog)
//!                               --> CONFLICT_LOG            (FileLog | MemoryLog)
//!                               --> LOSS_OF_SEPARATION_LOG  (FileLog | MemoryLog)
//! ```
//!
//! # Modules
//!
//! - [`sink`] -- The [`LogSink`] trait and row formatting
//! - [`file`] -- [`FileLog`], timestamped log files on disk
//! - [`memory`] -- [`MemoryLog`], shared in-memory buffers
//! - [`set`] -- [`LogSet`], the three logs owned together
//! - [`error`] -- Shared error types

pub mod error;
pub mod file;
pub mod memory;
pub mod set;
pub mod sink;

// Re-export primary types for convenience.
pub use error::SinkError;
pub use file::FileLog;
pub use memory::{LoggedRow, MemoryLog, MemoryLogHandle};
pub use set::{LogSet, MemoryLogs};
pub use sink::{LogSink, format_row};
