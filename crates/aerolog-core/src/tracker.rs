//! Entity lifecycle tracking.
//!
//! [`EntityTracker`] keeps the previous tick's active population and one
//! [`EntityAccumulator`] per active entity. Each [`refresh`] compares the
//! host's current population with the previous one:
//!
//! 1. every current entity's accumulator is overwritten with its latest
//!    position, distance flown and destination;
//! 2. `arrived = current \ previous`;
//! 3. `departed = previous \ current`;
//! 4. every departed entity produces one [`DepartureRecord`] from its last
//!    accumulator, which is then deleted;
//! 5. the active population is replaced with the current one.
//!
//! A refresh is all-or-nothing. Host lookups and the accumulator invariant
//! are checked before any state changes, so a failed refresh leaves the
//! tracker exactly as it was.
//!
//! [`refresh`]: EntityTracker::refresh

use std::collections::{BTreeMap, BTreeSet};

use aerolog_types::{DepartureRecord, Destination, EntityId, GeoPoint};
use tracing::{debug, warn};

use crate::geo;
use crate::host::TrafficView;

/// Errors that abort a refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// A departed entity has no accumulator. Population tracking has fallen
    /// out of sync with the host.
    #[error("departed entity {id} has no accumulator")]
    MissingAccumulator {
        /// The departed entity.
        id: EntityId,
    },

    /// The host listed an entity as active but could not resolve its state.
    #[error("active entity {id} has no {missing} in the host view")]
    UnresolvedEntity {
        /// The unresolved entity.
        id: EntityId,
        /// Which lookup failed.
        missing: &'static str,
    },
}

/// Last observed state of an active entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAccumulator {
    /// Last known position.
    pub last_position: GeoPoint,
    /// Last known cumulative distance flown, in meters.
    pub last_distance_flown_m: f64,
    /// Last known destination.
    pub destination: Destination,
}

impl EntityAccumulator {
    /// Remaining great-circle distance to the destination, if it is known.
    pub fn remaining_m(&self) -> Option<f64> {
        self.destination
            .point()
            .map(|dest| geo::distance_between(self.last_position, dest))
    }
}

/// Result of one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshOutcome {
    /// Entities seen for the first time this tick, in host order.
    pub arrived: Vec<EntityId>,
    /// One record per entity that disappeared this tick, in the order the
    /// entities were previously listed.
    pub departures: Vec<DepartureRecord>,
}

/// Rolling snapshot of the active population and per-entity accumulators.
#[derive(Debug, Clone, Default)]
pub struct EntityTracker {
    /// Active entities after the last refresh, in host order.
    active: Vec<EntityId>,
    /// Accumulated state, keyed by active entity.
    accumulators: BTreeMap<EntityId, EntityAccumulator>,
}

impl EntityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the host's current population against the previous tick.
    ///
    /// Duplicate callsigns in the host list are collapsed to their first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnresolvedEntity`] if the host lists an entity
    /// it cannot resolve, and [`TrackerError::MissingAccumulator`] if a
    /// departed entity has no accumulator. In both cases the tracker is left
    /// unchanged.
    pub fn refresh(&mut self, view: &dyn TrafficView) -> Result<RefreshOutcome, TrackerError> {
        // Observe: resolve every current entity before touching state.
        let mut current: BTreeSet<EntityId> = BTreeSet::new();
        let mut observations: Vec<(EntityId, EntityAccumulator)> = Vec::new();
        for id in view.active_ids() {
            if current.contains(&id) {
                continue;
            }
            let last_position =
                view.position_of(&id)
                    .ok_or_else(|| TrackerError::UnresolvedEntity {
                        id: id.clone(),
                        missing: "position",
                    })?;
            let last_distance_flown_m =
                view.distance_flown_of(&id)
                    .ok_or_else(|| TrackerError::UnresolvedEntity {
                        id: id.clone(),
                        missing: "distance flown",
                    })?;
            let destination = view.destination_of(&id);
            current.insert(id.clone());
            observations.push((
                id,
                EntityAccumulator {
                    last_position,
                    last_distance_flown_m,
                    destination,
                },
            ));
        }

        let previous: BTreeSet<&EntityId> = self.active.iter().collect();
        let arrived: Vec<EntityId> = observations
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !previous.contains(id))
            .cloned()
            .collect();
        let departed: Vec<EntityId> = self
            .active
            .iter()
            .filter(|id| !current.contains(*id))
            .cloned()
            .collect();

        if let Some(id) = departed
            .iter()
            .find(|id| !self.accumulators.contains_key(*id))
        {
            return Err(TrackerError::MissingAccumulator { id: id.clone() });
        }

        // Commit: nothing below can fail.
        let next_active: Vec<EntityId> = observations.iter().map(|(id, _)| id.clone()).collect();
        for (id, accumulator) in observations {
            self.accumulators.insert(id, accumulator);
        }

        let mut departures = Vec::with_capacity(departed.len());
        for id in departed {
            let Some(accumulator) = self.accumulators.remove(&id) else {
                continue;
            };
            if let Destination::Invalid { raw, reason } = &accumulator.destination {
                warn!(
                    entity = %id,
                    destination = %raw,
                    %reason,
                    "Unusable destination, departure logged without remaining distance"
                );
            }
            let record = DepartureRecord {
                remaining_m: accumulator.remaining_m(),
                distance_flown_m: accumulator.last_distance_flown_m,
                id,
            };
            debug!(
                entity = %record.id,
                distance_flown_m = record.distance_flown_m,
                remaining_m = ?record.remaining_m,
                "Entity departed"
            );
            departures.push(record);
        }

        for id in &arrived {
            debug!(entity = %id, "Entity arrived");
        }

        self.active = next_active;

        Ok(RefreshOutcome {
            arrived,
            departures,
        })
    }

    /// Active entities after the last refresh, in host order.
    pub fn active_ids(&self) -> &[EntityId] {
        &self.active
    }

    /// Whether an entity is currently active.
    pub fn is_active(&self, id: &EntityId) -> bool {
        self.accumulators.contains_key(id)
    }

    /// Accumulated state of an active entity.
    pub fn accumulator(&self, id: &EntityId) -> Option<&EntityAccumulator> {
        self.accumulators.get(id)
    }

    /// Number of active entities.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of accumulators held. Equal to [`active_count`] after every
    /// successful refresh.
    ///
    /// [`active_count`]: Self::active_count
    pub fn accumulator_count(&self) -> usize {
        self.accumulators.len()
    }

    /// Whether the tracker holds no entities and no accumulated state.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.accumulators.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aerolog_types::{EntityState, TrafficFrame};

    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    fn uav(name: &str, distance: f64) -> EntityState {
        EntityState::new(name, GeoPoint::new(52.0, 4.0), distance)
    }

    fn frame(entities: Vec<EntityState>) -> TrafficFrame {
        TrafficFrame::new(0.0, entities)
    }

    #[test]
    fn first_refresh_reports_arrivals_only() {
        let mut tracker = EntityTracker::new();
        let outcome = tracker
            .refresh(&frame(vec![uav("A", 0.0), uav("B", 0.0)]))
            .unwrap();

        assert_eq!(outcome.arrived, [id("A"), id("B")]);
        assert!(outcome.departures.is_empty());
        assert_eq!(tracker.active_ids(), [id("A"), id("B")]);
        assert_eq!(tracker.accumulator_count(), 2);
    }

    #[test]
    fn departure_uses_last_known_distance() {
        let mut tracker = EntityTracker::new();
        tracker
            .refresh(&frame(vec![uav("A", 120.0), uav("B", 80.0)]))
            .unwrap();

        let outcome = tracker.refresh(&frame(vec![uav("B", 95.0)])).unwrap();

        assert!(outcome.arrived.is_empty());
        assert_eq!(outcome.departures.len(), 1);
        let record = outcome.departures.first().unwrap();
        assert_eq!(record.id, id("A"));
        assert!((record.distance_flown_m - 120.0).abs() < 1e-9);
        assert_eq!(record.remaining_m, None);
        assert!(tracker.accumulator(&id("A")).is_none());
        assert_eq!(tracker.accumulator_count(), 1);
    }

    #[test]
    fn accumulator_is_overwritten_every_tick() {
        let mut tracker = EntityTracker::new();
        tracker.refresh(&frame(vec![uav("A", 10.0)])).unwrap();
        tracker.refresh(&frame(vec![uav("A", 25.0)])).unwrap();
        tracker.refresh(&frame(vec![uav("A", 40.0)])).unwrap();

        let acc = tracker.accumulator(&id("A")).unwrap();
        assert!((acc.last_distance_flown_m - 40.0).abs() < 1e-9);

        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        let record = outcome.departures.first().unwrap();
        assert!((record.distance_flown_m - 40.0).abs() < 1e-9);
    }

    #[test]
    fn departure_with_destination_reports_remaining_distance() {
        let mut tracker = EntityTracker::new();
        let a = EntityState::new("A", GeoPoint::new(10.0, 20.0), 500.0)
            .with_destination(Destination::At(GeoPoint::new(11.0, 20.0)));
        tracker.refresh(&frame(vec![a])).unwrap();

        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        let remaining = outcome.departures.first().unwrap().remaining_m.unwrap();
        assert!((remaining - 111_195.0).abs() < 100.0, "got {remaining}");
    }

    #[test]
    fn invalid_destination_still_logs_departure() {
        let mut tracker = EntityTracker::new();
        let a = EntityState::new("A", GeoPoint::new(0.0, 0.0), 75.0)
            .with_destination(Destination::from_text("nowhere"));
        tracker.refresh(&frame(vec![a])).unwrap();

        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        assert_eq!(outcome.departures.len(), 1);
        assert_eq!(outcome.departures.first().unwrap().remaining_m, None);
    }

    #[test]
    fn reordering_does_not_depart_anyone() {
        let mut tracker = EntityTracker::new();
        tracker
            .refresh(&frame(vec![uav("A", 0.0), uav("B", 0.0), uav("C", 0.0)]))
            .unwrap();
        let outcome = tracker
            .refresh(&frame(vec![uav("C", 1.0), uav("A", 1.0), uav("B", 1.0)]))
            .unwrap();

        assert!(outcome.arrived.is_empty());
        assert!(outcome.departures.is_empty());
        assert_eq!(tracker.active_ids(), [id("C"), id("A"), id("B")]);
    }

    #[test]
    fn departures_follow_previous_listing_order() {
        let mut tracker = EntityTracker::new();
        tracker
            .refresh(&frame(vec![uav("C", 0.0), uav("A", 0.0), uav("B", 0.0)]))
            .unwrap();
        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        let order: Vec<&str> = outcome.departures.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }

    #[test]
    fn reappearing_callsign_is_a_new_entity() {
        let mut tracker = EntityTracker::new();
        tracker.refresh(&frame(vec![uav("A", 300.0)])).unwrap();
        tracker.refresh(&frame(Vec::new())).unwrap();

        let outcome = tracker.refresh(&frame(vec![uav("A", 5.0)])).unwrap();
        assert_eq!(outcome.arrived, [id("A")]);

        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        let record = outcome.departures.first().unwrap();
        assert!((record.distance_flown_m - 5.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_ids_are_collapsed() {
        let mut tracker = EntityTracker::new();
        let outcome = tracker
            .refresh(&frame(vec![uav("A", 1.0), uav("A", 2.0)]))
            .unwrap();
        assert_eq!(outcome.arrived, [id("A")]);
        assert_eq!(tracker.active_count(), 1);

        let outcome = tracker.refresh(&frame(Vec::new())).unwrap();
        assert_eq!(outcome.departures.len(), 1);
    }

    #[test]
    fn empty_ticks_leave_tracker_empty() {
        let mut tracker = EntityTracker::new();
        tracker
            .refresh(&frame(vec![uav("A", 0.0), uav("B", 0.0)]))
            .unwrap();
        for _ in 0..5 {
            tracker.refresh(&frame(Vec::new())).unwrap();
        }
        assert!(tracker.is_empty());
    }

    /// Host view that lists an entity it cannot resolve.
    struct BrokenView;

    impl TrafficView for BrokenView {
        fn sim_time(&self) -> f64 {
            0.0
        }
        fn active_ids(&self) -> Vec<EntityId> {
            vec![EntityId::from("GHOST")]
        }
        fn position_of(&self, _id: &EntityId) -> Option<GeoPoint> {
            None
        }
        fn distance_flown_of(&self, _id: &EntityId) -> Option<f64> {
            Some(0.0)
        }
        fn destination_of(&self, _id: &EntityId) -> Destination {
            Destination::Unknown
        }
        fn conflict_pairs(&self) -> Vec<aerolog_types::EntityPair> {
            Vec::new()
        }
        fn separation_pairs(&self) -> Vec<aerolog_types::EntityPair> {
            Vec::new()
        }
    }

    #[test]
    fn unresolved_entity_aborts_without_mutation() {
        let mut tracker = EntityTracker::new();
        tracker.refresh(&frame(vec![uav("A", 10.0)])).unwrap();

        let err = tracker.refresh(&BrokenView).unwrap_err();
        assert_eq!(
            err,
            TrackerError::UnresolvedEntity {
                id: id("GHOST"),
                missing: "position",
            }
        );
        assert_eq!(tracker.active_ids(), [id("A")]);
        assert!(tracker.accumulator(&id("A")).is_some());
    }

    #[test]
    fn missing_accumulator_is_reported() {
        let mut tracker = EntityTracker::new();
        tracker.refresh(&frame(vec![uav("A", 10.0)])).unwrap();
        // Corrupt the bookkeeping to simulate a tracking bug.
        tracker.accumulators.clear();

        let err = tracker.refresh(&frame(Vec::new())).unwrap_err();
        assert_eq!(err, TrackerError::MissingAccumulator { id: id("A") });
        assert_eq!(tracker.active_ids(), [id("A")]);
    }

    #[test]
    fn every_disappearance_yields_exactly_one_departure() {
        // Deterministic churn: entity i is present on ticks where
        // (tick + i) % (i + 2) != 0.
        let names: Vec<String> = (0..8).map(|i| format!("UAV{i}")).collect();
        let mut tracker = EntityTracker::new();
        let mut present_before: BTreeSet<String> = BTreeSet::new();

        for tick in 0_usize..40 {
            let present: Vec<&String> = names
                .iter()
                .enumerate()
                .filter(|(i, _)| (tick + i) % (i + 2) != 0)
                .map(|(_, n)| n)
                .collect();
            let entities = present.iter().map(|n| uav(n, 1.0)).collect();

            let outcome = tracker.refresh(&frame(entities)).unwrap();

            let now: BTreeSet<String> = present.iter().map(|n| (*n).clone()).collect();
            let expected: BTreeSet<String> = present_before.difference(&now).cloned().collect();
            let departed: BTreeSet<String> = outcome
                .departures
                .iter()
                .map(|r| r.id.as_str().to_owned())
                .collect();

            assert_eq!(departed.len(), outcome.departures.len());
            assert_eq!(departed, expected, "tick {tick}");
            for gone in &departed {
                assert!(tracker.accumulator(&EntityId::from(gone.as_str())).is_none());
                assert!(!now.contains(gone));
            }
            assert_eq!(tracker.accumulator_count(), tracker.active_count());
            present_before = now;
        }
    }
}
