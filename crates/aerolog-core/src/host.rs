//! The host boundary.
//!
//! The simulation engine owns the vehicles, their kinematics and the
//! conflict detector. Once per tick the recorder reads a [`TrafficView`]: the
//! ordered list of active callsigns, per-callsign lookups, and the proximity
//! pairs the detector reported as new this tick.
//!
//! [`TrafficFrame`] is the stock implementation, used by replay traces, the
//! synthetic host and tests.

use aerolog_types::{Destination, EntityId, EntityPair, GeoPoint, TrafficFrame};

/// Read-only view of the host's traffic at the current tick.
///
/// Lookups return `None` for callsigns the host does not know. A callsign
/// listed by [`active_ids`](Self::active_ids) must resolve through
/// [`position_of`](Self::position_of) and
/// [`distance_flown_of`](Self::distance_flown_of).
pub trait TrafficView {
    /// Simulation time of this tick, in seconds.
    fn sim_time(&self) -> f64;

    /// Active callsigns, in host order.
    fn active_ids(&self) -> Vec<EntityId>;

    /// Current position of an entity.
    fn position_of(&self, id: &EntityId) -> Option<GeoPoint>;

    /// Cumulative distance flown by an entity, in meters.
    fn distance_flown_of(&self, id: &EntityId) -> Option<f64>;

    /// Destination of an entity, already converted at ingestion.
    fn destination_of(&self, id: &EntityId) -> Destination;

    /// Conflict pairs that are new this tick.
    fn conflict_pairs(&self) -> Vec<EntityPair>;

    /// Loss-of-separation pairs that are new this tick.
    fn separation_pairs(&self) -> Vec<EntityPair>;
}

impl TrafficView for TrafficFrame {
    fn sim_time(&self) -> f64 {
        Self::sim_time(self)
    }

    fn active_ids(&self) -> Vec<EntityId> {
        self.entities().iter().map(|e| e.id.clone()).collect()
    }

    fn position_of(&self, id: &EntityId) -> Option<GeoPoint> {
        self.entity(id).map(|e| e.position)
    }

    fn distance_flown_of(&self, id: &EntityId) -> Option<f64> {
        self.entity(id).map(|e| e.distance_flown_m)
    }

    fn destination_of(&self, id: &EntityId) -> Destination {
        self.entity(id)
            .map(|e| e.destination.clone())
            .unwrap_or_default()
    }

    fn conflict_pairs(&self) -> Vec<EntityPair> {
        self.conflicts().to_vec()
    }

    fn separation_pairs(&self) -> Vec<EntityPair> {
        self.separations().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aerolog_types::EntityState;

    use super::*;

    #[test]
    fn frame_lookups_resolve_listed_entities() {
        let frame = TrafficFrame::new(
            5.0,
            vec![
                EntityState::new("B", GeoPoint::new(1.0, 2.0), 30.0)
                    .with_destination(Destination::At(GeoPoint::new(1.1, 2.1))),
                EntityState::new("A", GeoPoint::new(3.0, 4.0), 10.0),
            ],
        );
        let view: &dyn TrafficView = &frame;

        assert_eq!(view.active_ids(), [EntityId::from("B"), EntityId::from("A")]);
        assert_eq!(
            view.position_of(&EntityId::from("A")),
            Some(GeoPoint::new(3.0, 4.0))
        );
        assert!((view.distance_flown_of(&EntityId::from("B")).unwrap() - 30.0).abs() < 1e-9);
        assert!(view.destination_of(&EntityId::from("B")).point().is_some());
        assert_eq!(view.destination_of(&EntityId::from("A")), Destination::Unknown);
        assert_eq!(view.position_of(&EntityId::from("Z")), None);
    }
}
