//! Entity lifecycle tracking, proximity logging and the telemetry tick for
//! the Aerolog recorder.
//!
//! Once per recorder interval the [`TelemetryScheduler`] reads the host's
//! traffic through a [`TrafficView`], emits one departure record per entity
//! that disappeared, one record per new conflict pair, and one record per new
//! loss-of-separation pair annotated with the great-circle distance.
//!
//! # Modules
//!
//! - [`geo`] -- Haversine distance on a spherical Earth.
//! - [`host`] -- The [`TrafficView`] boundary to the simulation host.
//! - [`tracker`] -- Per-entity accumulators and departure detection.
//! - [`proximity`] -- Conflict and loss-of-separation records, with an
//!   optional [`PairGate`].
//! - [`scheduler`] -- The ordered per-tick update.
//! - [`command`] -- The `TELEMETRY LIST | ON` console command.
//! - [`config`] -- Configuration loading from `aerolog-config.yaml`.
//! - [`runner`] -- The async recorder loop and its run controls.
//! - [`status`] -- Status snapshots for concurrent readers.
//!
//! [`TelemetryScheduler`]: scheduler::TelemetryScheduler
//! [`TrafficView`]: host::TrafficView
//! [`PairGate`]: proximity::PairGate

pub mod command;
pub mod config;
pub mod geo;
pub mod host;
pub mod proximity;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod tracker;
