//! Per-tick host snapshots.
//!
//! A [`TrafficFrame`] is everything the host tells the recorder about one
//! tick: the simulation time, the ordered list of active entities with their
//! kinematic state, the proximity pairs detected this tick, and any console
//! command lines typed since the previous tick.
//!
//! Frames are the wire format of replay traces (one JSON object per line)
//! and the in-memory form built by embedded hosts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::{Destination, GeoPoint};
use crate::ids::EntityId;
use crate::pairs::EntityPair;

/// Read-only view of one active entity at the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity's callsign.
    pub id: EntityId,
    /// Current position.
    pub position: GeoPoint,
    /// Cumulative distance flown since creation, in meters.
    #[serde(default)]
    pub distance_flown_m: f64,
    /// Where the entity is heading, converted at ingestion.
    #[serde(default)]
    pub destination: Destination,
}

impl EntityState {
    /// Create an entity state with no destination.
    pub fn new(id: impl Into<EntityId>, position: GeoPoint, distance_flown_m: f64) -> Self {
        Self {
            id: id.into(),
            position,
            distance_flown_m,
            destination: Destination::Unknown,
        }
    }

    /// Attach a destination.
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }
}

/// Serialized shape of a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    sim_time: f64,
    #[serde(default)]
    entities: Vec<EntityState>,
    #[serde(default)]
    conflicts: Vec<EntityPair>,
    #[serde(default)]
    separations: Vec<EntityPair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    commands: Vec<String>,
}

/// One tick's worth of host state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameRecord", into = "FrameRecord")]
pub struct TrafficFrame {
    sim_time: f64,
    entities: Vec<EntityState>,
    conflicts: Vec<EntityPair>,
    separations: Vec<EntityPair>,
    commands: Vec<String>,
    index: BTreeMap<EntityId, usize>,
}

impl TrafficFrame {
    /// Create a frame from the active entities, in host order.
    pub fn new(sim_time: f64, entities: Vec<EntityState>) -> Self {
        Self::from(FrameRecord {
            sim_time,
            entities,
            ..FrameRecord::default()
        })
    }

    /// Create a frame with no active entities.
    pub fn empty(sim_time: f64) -> Self {
        Self::new(sim_time, Vec::new())
    }

    /// Attach the conflict pairs reported this tick.
    #[must_use]
    pub fn with_conflicts(mut self, conflicts: Vec<EntityPair>) -> Self {
        self.conflicts = conflicts;
        self
    }

    /// Attach the loss-of-separation pairs reported this tick.
    #[must_use]
    pub fn with_separations(mut self, separations: Vec<EntityPair>) -> Self {
        self.separations = separations;
        self
    }

    /// Attach console command lines to run before this tick is recorded.
    #[must_use]
    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = commands;
        self
    }

    /// Simulation time of this frame, in seconds.
    pub const fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Active entities in host order.
    pub fn entities(&self) -> &[EntityState] {
        &self.entities
    }

    /// Look up an active entity by identifier.
    ///
    /// When the host listed the same identifier twice, the first entry wins.
    pub fn entity(&self, id: &EntityId) -> Option<&EntityState> {
        self.index.get(id).and_then(|&i| self.entities.get(i))
    }

    /// Conflict pairs reported this tick.
    pub fn conflicts(&self) -> &[EntityPair] {
        &self.conflicts
    }

    /// Loss-of-separation pairs reported this tick.
    pub fn separations(&self) -> &[EntityPair] {
        &self.separations
    }

    /// Console command lines attached to this frame.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl From<FrameRecord> for TrafficFrame {
    fn from(record: FrameRecord) -> Self {
        let mut index = BTreeMap::new();
        for (i, entity) in record.entities.iter().enumerate() {
            index.entry(entity.id.clone()).or_insert(i);
        }
        Self {
            sim_time: record.sim_time,
            entities: record.entities,
            conflicts: record.conflicts,
            separations: record.separations,
            commands: record.commands,
            index,
        }
    }
}

impl From<TrafficFrame> for FrameRecord {
    fn from(frame: TrafficFrame) -> Self {
        Self {
            sim_time: frame.sim_time,
            entities: frame.entities,
            conflicts: frame.conflicts,
            separations: frame.separations,
            commands: frame.commands,
        }
    }
}
