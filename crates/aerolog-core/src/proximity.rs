//! Conflict and loss-of-separation logging.
//!
//! The host's conflict detector reports pairs that are new this tick. The
//! [`ProximityLogger`] turns each conflict pair into a [`ConflictRecord`] and
//! each loss-of-separation pair into a [`SeparationRecord`] annotated with
//! the great-circle distance between the two members.
//!
//! By default the host's "new this tick" guarantee is trusted and every
//! supplied pair is logged. Hosts that re-report ongoing events every tick
//! can enable a [`PairGate`] per event type, which logs a pair only on the
//! tick it opens.

use std::collections::BTreeSet;

use aerolog_types::{ConflictRecord, EntityId, EntityPair, SeparationRecord};
use tracing::{debug, warn};

use crate::geo;
use crate::host::TrafficView;

/// Tracks which unordered pairs were open on the previous tick.
///
/// A pair passes the gate only if it was not reported on the previous tick.
/// Pairs that stop being reported close; if they are reported again later
/// they pass once more.
#[derive(Debug, Clone, Default)]
pub struct PairGate {
    open: BTreeSet<(EntityId, EntityId)>,
}

impl PairGate {
    /// Create a gate with no open pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter this tick's pairs down to the ones that just opened, and
    /// remember the full set for the next tick.
    pub fn admit(&mut self, pairs: Vec<EntityPair>) -> Vec<EntityPair> {
        let mut now_open = BTreeSet::new();
        let mut opened = Vec::new();
        for pair in pairs {
            let key = pair.unordered_key();
            if !self.open.contains(&key) && !now_open.contains(&key) {
                opened.push(pair);
            }
            now_open.insert(key);
        }
        self.open = now_open;
        opened
    }

    /// Forget that `pair` is open, so it passes again if it is still
    /// reported on the next tick.
    pub fn reopen(&mut self, pair: &EntityPair) {
        self.open.remove(&pair.unordered_key());
    }
}

/// Records produced by one [`ProximityLogger::process`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityOutcome {
    /// One record per conflict pair.
    pub conflicts: Vec<ConflictRecord>,
    /// One record per loss-of-separation pair whose members resolved.
    pub separations: Vec<SeparationRecord>,
    /// Separation pairs dropped because a member had no position.
    pub skipped: Vec<EntityPair>,
}

/// Converts per-tick proximity pairs into log records.
#[derive(Debug, Clone, Default)]
pub struct ProximityLogger {
    conflict_gate: Option<PairGate>,
    separation_gate: Option<PairGate>,
}

impl ProximityLogger {
    /// A logger that trusts the host to report each event once.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that only logs pairs on the tick they open.
    pub fn deduplicating() -> Self {
        Self {
            conflict_gate: Some(PairGate::new()),
            separation_gate: Some(PairGate::new()),
        }
    }

    /// Whether pairs are filtered through a [`PairGate`].
    pub const fn is_deduplicating(&self) -> bool {
        self.conflict_gate.is_some()
    }

    /// Convert the conflict pairs reported this tick.
    pub fn process_conflicts(&mut self, pairs: Vec<EntityPair>) -> Vec<ConflictRecord> {
        let pairs = match self.conflict_gate.as_mut() {
            Some(gate) => gate.admit(pairs),
            None => pairs,
        };
        pairs
            .into_iter()
            .map(|pair| {
                debug!(first = %pair.first, second = %pair.second, "Conflict");
                ConflictRecord {
                    first: pair.first,
                    second: pair.second,
                }
            })
            .collect()
    }

    /// Convert the loss-of-separation pairs reported this tick, resolving
    /// member positions through the host view.
    ///
    /// Returns the records and the pairs that had to be skipped. A skipped
    /// pair is not held open by the gate, so it is logged once its members
    /// resolve.
    pub fn process_separations(
        &mut self,
        pairs: Vec<EntityPair>,
        view: &dyn TrafficView,
    ) -> (Vec<SeparationRecord>, Vec<EntityPair>) {
        let pairs = match self.separation_gate.as_mut() {
            Some(gate) => gate.admit(pairs),
            None => pairs,
        };

        let mut records = Vec::with_capacity(pairs.len());
        let mut skipped = Vec::new();
        for pair in pairs {
            let (Some(a), Some(b)) = (view.position_of(&pair.first), view.position_of(&pair.second))
            else {
                warn!(
                    first = %pair.first,
                    second = %pair.second,
                    "Loss of separation member has no position, pair skipped"
                );
                if let Some(gate) = self.separation_gate.as_mut() {
                    gate.reopen(&pair);
                }
                skipped.push(pair);
                continue;
            };
            let distance_m = geo::distance_between(a, b);
            debug!(first = %pair.first, second = %pair.second, distance_m, "Loss of separation");
            records.push(SeparationRecord {
                first: pair.first,
                second: pair.second,
                distance_m,
            });
        }
        (records, skipped)
    }

    /// Convert both pair lists of the current tick.
    pub fn process(&mut self, view: &dyn TrafficView) -> ProximityOutcome {
        let conflicts = self.process_conflicts(view.conflict_pairs());
        let (separations, skipped) = self.process_separations(view.separation_pairs(), view);
        ProximityOutcome {
            conflicts,
            separations,
            skipped,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aerolog_types::{EntityState, GeoPoint, TrafficFrame};

    use super::*;

    fn two_uavs() -> Vec<EntityState> {
        vec![
            EntityState::new("A", GeoPoint::new(52.0, 4.0), 0.0),
            EntityState::new("B", GeoPoint::new(52.001, 4.0), 0.0),
            EntityState::new("C", GeoPoint::new(52.0, 4.001), 0.0),
        ]
    }

    #[test]
    fn one_conflict_record_per_pair_in_supplied_order() {
        let frame = TrafficFrame::new(0.0, two_uavs())
            .with_conflicts(vec![EntityPair::new("B", "A"), EntityPair::new("A", "C")]);
        let outcome = ProximityLogger::new().process(&frame);

        assert_eq!(outcome.conflicts.len(), 2);
        let first = outcome.conflicts.first().unwrap();
        assert_eq!(first.first.as_str(), "B");
        assert_eq!(first.second.as_str(), "A");
        assert!(outcome.separations.is_empty());
    }

    #[test]
    fn separation_records_carry_distance() {
        let frame = TrafficFrame::new(0.0, two_uavs())
            .with_separations(vec![EntityPair::new("A", "B")]);
        let outcome = ProximityLogger::new().process(&frame);

        assert_eq!(outcome.separations.len(), 1);
        let record = outcome.separations.first().unwrap();
        // 0.001 degrees of latitude is about 111 m.
        assert!((record.distance_m - 111.2).abs() < 1.0, "got {}", record.distance_m);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn separation_with_unknown_member_is_skipped() {
        let frame = TrafficFrame::new(0.0, two_uavs())
            .with_separations(vec![EntityPair::new("A", "GONE"), EntityPair::new("A", "C")]);
        let outcome = ProximityLogger::new().process(&frame);

        assert_eq!(outcome.separations.len(), 1);
        assert_eq!(outcome.skipped, [EntityPair::new("A", "GONE")]);
    }

    #[test]
    fn trusting_logger_logs_repeats() {
        let mut logger = ProximityLogger::new();
        let frame =
            TrafficFrame::new(0.0, two_uavs()).with_conflicts(vec![EntityPair::new("A", "B")]);
        assert_eq!(logger.process(&frame).conflicts.len(), 1);
        assert_eq!(logger.process(&frame).conflicts.len(), 1);
    }

    #[test]
    fn gate_logs_pairs_only_when_they_open() {
        let mut gate = PairGate::new();

        let opened = gate.admit(vec![EntityPair::new("A", "B")]);
        assert_eq!(opened.len(), 1);

        // Still open, reported in the other order.
        let opened = gate.admit(vec![EntityPair::new("B", "A"), EntityPair::new("A", "C")]);
        assert_eq!(opened, [EntityPair::new("A", "C")]);

        // A-B closes, then reopens.
        assert!(gate.admit(vec![EntityPair::new("A", "C")]).is_empty());
        let opened = gate.admit(vec![EntityPair::new("A", "B")]);
        assert_eq!(opened, [EntityPair::new("A", "B")]);
    }

    #[test]
    fn gate_collapses_duplicates_within_a_tick() {
        let mut gate = PairGate::new();
        let opened = gate.admit(vec![EntityPair::new("A", "B"), EntityPair::new("B", "A")]);
        assert_eq!(opened, [EntityPair::new("A", "B")]);
    }

    #[test]
    fn deduplicating_logger_gates_each_event_type_separately() {
        let mut logger = ProximityLogger::deduplicating();
        assert!(logger.is_deduplicating());

        let frame = TrafficFrame::new(0.0, two_uavs())
            .with_conflicts(vec![EntityPair::new("A", "B")])
            .with_separations(vec![EntityPair::new("A", "B")]);

        let first = logger.process(&frame);
        assert_eq!(first.conflicts.len(), 1);
        assert_eq!(first.separations.len(), 1);

        let second = logger.process(&frame);
        assert!(second.conflicts.is_empty());
        assert!(second.separations.is_empty());
    }

    #[test]
    fn gate_reopen_lets_a_pair_pass_again() {
        let mut gate = PairGate::new();
        gate.admit(vec![EntityPair::new("A", "B"), EntityPair::new("A", "C")]);
        gate.reopen(&EntityPair::new("B", "A"));

        let opened = gate.admit(vec![EntityPair::new("A", "B"), EntityPair::new("A", "C")]);
        assert_eq!(opened, [EntityPair::new("A", "B")]);
    }

    #[test]
    fn skipped_separation_is_logged_once_its_members_resolve() {
        let mut logger = ProximityLogger::deduplicating();
        let pair = vec![EntityPair::new("A", "B")];

        // B has not shown up in the entity list yet.
        let a = EntityState::new("A", GeoPoint::new(52.0, 4.0), 0.0);
        let only_a = TrafficFrame::new(0.0, vec![a]).with_separations(pair.clone());
        let first = logger.process(&only_a);
        assert!(first.separations.is_empty());
        assert_eq!(first.skipped.len(), 1);

        let both = TrafficFrame::new(1.0, two_uavs()).with_separations(pair.clone());
        let second = logger.process(&both);
        assert_eq!(second.separations.len(), 1);
        assert!(second.skipped.is_empty());

        let third = logger.process(&TrafficFrame::new(2.0, two_uavs()).with_separations(pair));
        assert!(third.separations.is_empty());
    }
}
