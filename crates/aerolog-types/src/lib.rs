//! Shared type definitions for the Aerolog telemetry recorder.
//!
//! This crate is the single source of truth for the values that cross the
//! boundary between the host simulation, the recorder core and the log sinks.
//!
//! # Modules
//!
//! - [`ids`] -- [`EntityId`], the callsign newtype
//! - [`geo`] -- [`GeoPoint`] and the structured [`Destination`]
//! - [`pairs`] -- [`EntityPair`] for conflict and separation events
//! - [`frame`] -- [`TrafficFrame`], one tick of host state
//! - [`records`] -- [`LogKind`] and the records written to each log

pub mod frame;
pub mod geo;
pub mod ids;
pub mod pairs;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use frame::{EntityState, TrafficFrame};
pub use geo::{Destination, GeoParseError, GeoPoint};
pub use ids::EntityId;
pub use pairs::EntityPair;
pub use records::{
    ConflictRecord, DepartureRecord, Field, LogKind, LogRecord, SeparationRecord,
};
