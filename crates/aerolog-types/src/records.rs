//! Log kinds and the records written to them.
//!
//! There are exactly three logs, each with a fixed name, a fixed header
//! block and a fixed column schema. The sink prepends the simulation time to
//! every row, so records only carry their own columns.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// The three named logs produced by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogKind {
    /// One row per departed UAV with its final trip metrics.
    Uav,
    /// One row per newly reported conflict pair.
    Conflict,
    /// One row per newly reported loss-of-separation pair.
    LossOfSeparation,
}

impl LogKind {
    /// All log kinds, in the order they are listed and enabled.
    pub const ALL: [Self; 3] = [Self::Uav, Self::Conflict, Self::LossOfSeparation];

    /// The fixed logger name used by the command surface and file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uav => "UAV_LOG",
            Self::Conflict => "CONFLICT_LOG",
            Self::LossOfSeparation => "LOSS_OF_SEPARATION_LOG",
        }
    }

    /// Header block written once at the top of each log file.
    pub const fn header(self) -> &'static str {
        match self {
            Self::Uav => {
                "UAV LOG\n\
                 Final trip metrics of every UAV removed from the simulation\n\
                 \n\
                 Deletion Time [s], UAV, Distance Flown [m], Remaining Distance [m]"
            }
            Self::Conflict => {
                "CONFLICT LOG\n\
                 Every newly detected conflict between two UAVs\n\
                 \n\
                 Simulation Time [s], UAV A, UAV B"
            }
            Self::LossOfSeparation => {
                "LOSS OF SEPARATION LOG\n\
                 Every newly detected loss of separation between two UAVs\n\
                 \n\
                 Simulation Time [s], UAV A, UAV B, Distance Between [m]"
            }
        }
    }
}

impl core::fmt::Display for LogKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single column value in a log row.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Free text, written verbatim.
    Text(String),
    /// A distance or other measurement, written with fixed precision.
    Float(f64),
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Float(value) => write!(f, "{value:.3}"),
        }
    }
}

impl From<&EntityId> for Field {
    fn from(id: &EntityId) -> Self {
        Self::Text(id.as_str().to_owned())
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A record that knows which log it belongs to and how to render its row.
pub trait LogRecord {
    /// The log this record is written to.
    fn kind(&self) -> LogKind;

    /// The record's columns, excluding the sink-assigned timestamp.
    fn fields(&self) -> Vec<Field>;
}

/// Final trip metrics of an entity that left the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartureRecord {
    /// The departed entity.
    pub id: EntityId,
    /// Cumulative distance flown as last observed, in meters.
    pub distance_flown_m: f64,
    /// Great-circle distance from the last known position to the destination,
    /// in meters. `None` when no valid destination was known; the column is
    /// then omitted from the row.
    pub remaining_m: Option<f64>,
}

impl LogRecord for DepartureRecord {
    fn kind(&self) -> LogKind {
        LogKind::Uav
    }

    fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::from(&self.id), Field::from(self.distance_flown_m)];
        if let Some(remaining) = self.remaining_m {
            fields.push(Field::from(remaining));
        }
        fields
    }
}

/// A conflict between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// First member, as supplied by the host.
    pub first: EntityId,
    /// Second member, as supplied by the host.
    pub second: EntityId,
}

impl LogRecord for ConflictRecord {
    fn kind(&self) -> LogKind {
        LogKind::Conflict
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::from(&self.first), Field::from(&self.second)]
    }
}

/// A loss of separation between two entities, with their distance apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationRecord {
    /// First member, as supplied by the host.
    pub first: EntityId,
    /// Second member, as supplied by the host.
    pub second: EntityId,
    /// Great-circle distance between the two members, in meters.
    pub distance_m: f64,
}

impl LogRecord for SeparationRecord {
    fn kind(&self) -> LogKind {
        LogKind::LossOfSeparation
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::from(&self.first),
            Field::from(&self.second),
            Field::from(self.distance_m),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_names_are_fixed() {
        let names: Vec<&str> = LogKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["UAV_LOG", "CONFLICT_LOG", "LOSS_OF_SEPARATION_LOG"]);
    }

    #[test]
    fn departure_without_destination_omits_column() {
        let record = DepartureRecord {
            id: EntityId::from("A"),
            distance_flown_m: 1200.0,
            remaining_m: None,
        };
        let fields = record.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.first().map(ToString::to_string).as_deref(), Some("A"));
        assert_eq!(fields.get(1).map(ToString::to_string).as_deref(), Some("1200.000"));
    }

    #[test]
    fn departure_with_destination_has_remaining_column() {
        let record = DepartureRecord {
            id: EntityId::from("A"),
            distance_flown_m: 10.0,
            remaining_m: Some(2.5),
        };
        assert_eq!(record.fields().len(), 3);
        assert_eq!(record.kind(), LogKind::Uav);
    }

    #[test]
    fn separation_row_has_distance_column() {
        let record = SeparationRecord {
            first: EntityId::from("A"),
            second: EntityId::from("B"),
            distance_m: 45.25,
        };
        let rendered: Vec<String> = record.fields().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["A", "B", "45.250"]);
    }

    #[test]
    fn header_ends_with_column_line() {
        for kind in LogKind::ALL {
            let last = kind.header().lines().last().unwrap_or_default();
            assert!(last.contains("Time [s]"), "{kind}: {last}");
        }
    }
}
