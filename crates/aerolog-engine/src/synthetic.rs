//! Seeded synthetic traffic host.
//!
//! When no replay trace is configured, the engine records traffic generated
//! here: UAVs spawn at random points inside a circular area, fly straight
//! towards a random destination at constant speed, and are removed from the
//! host once they arrive. Conflict and loss-of-separation pairs are computed
//! from pairwise distances and reported only on the tick they open.

use std::collections::BTreeMap;

use aerolog_core::geo;
use aerolog_core::proximity::PairGate;
use aerolog_core::runner::{FrameSource, SourceError};
use aerolog_types::{Destination, EntityId, EntityPair, EntityState, GeoPoint, TrafficFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info};

/// Meters per degree of latitude on the recorder's spherical Earth.
const METERS_PER_DEGREE: f64 = geo::EARTH_RADIUS_M * core::f64::consts::PI / 180.0;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Configuration for the synthetic host, loaded from the `synthetic`
/// section of `aerolog-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyntheticConfig {
    /// Random seed; the same seed yields the same traffic.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum number of UAVs airborne at once.
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,

    /// Probability of spawning one UAV per tick while below the cap.
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,

    /// Ground speed of every UAV, in meters per second.
    #[serde(default = "default_speed_mps")]
    pub speed_mps: f64,

    /// Latitude of the area center.
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    /// Longitude of the area center.
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    /// Radius of the area origins and destinations are drawn from, in
    /// meters.
    #[serde(default = "default_area_radius_m")]
    pub area_radius_m: f64,

    /// Distance below which two UAVs are in conflict, in meters.
    #[serde(default = "default_conflict_radius_m")]
    pub conflict_radius_m: f64,

    /// Distance below which two UAVs have lost separation, in meters.
    #[serde(default = "default_separation_radius_m")]
    pub separation_radius_m: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_entities: default_max_entities(),
            spawn_probability: default_spawn_probability(),
            speed_mps: default_speed_mps(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            area_radius_m: default_area_radius_m(),
            conflict_radius_m: default_conflict_radius_m(),
            separation_radius_m: default_separation_radius_m(),
        }
    }
}

impl SyntheticConfig {
    /// Check value ranges that serde cannot express.
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(format!(
                "synthetic.spawn_probability must be within [0, 1], got {}",
                self.spawn_probability
            ));
        }
        // Longitude offsets scale with 1/cos(lat), which blows up at the poles.
        if !self.center_lat.is_finite() || self.center_lat.abs() >= 90.0 {
            return Err(format!(
                "synthetic.center_lat must be within (-90, 90), got {}",
                self.center_lat
            ));
        }
        if !(-180.0..=180.0).contains(&self.center_lon) {
            return Err(format!(
                "synthetic.center_lon must be within [-180, 180], got {}",
                self.center_lon
            ));
        }
        let positive = [
            ("synthetic.speed_mps", self.speed_mps),
            ("synthetic.area_radius_m", self.area_radius_m),
            ("synthetic.conflict_radius_m", self.conflict_radius_m),
            ("synthetic.separation_radius_m", self.separation_radius_m),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{field} must be positive, got {value}"));
            }
        }
        Ok(())
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_entities() -> usize {
    20
}

const fn default_spawn_probability() -> f64 {
    0.25
}

const fn default_speed_mps() -> f64 {
    15.0
}

const fn default_center_lat() -> f64 {
    52.0
}

const fn default_center_lon() -> f64 {
    4.375
}

const fn default_area_radius_m() -> f64 {
    2_000.0
}

const fn default_conflict_radius_m() -> f64 {
    150.0
}

const fn default_separation_radius_m() -> f64 {
    50.0
}

// -----------------------------------------------------------------------
// Traffic
// -----------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Uav {
    id: EntityId,
    position: GeoPoint,
    destination: GeoPoint,
    distance_flown_m: f64,
}

impl Uav {
    fn state(&self) -> EntityState {
        EntityState::new(self.id.clone(), self.position, self.distance_flown_m)
            .with_destination(Destination::At(self.destination))
    }

    /// Fly `step_m` meters towards the destination. Returns `true` once the
    /// destination is reached.
    fn advance(&mut self, step_m: f64) -> bool {
        let remaining = geo::distance_between(self.position, self.destination);
        if remaining <= step_m {
            self.position = self.destination;
            self.distance_flown_m += remaining;
            return true;
        }
        let fraction = step_m / remaining;
        self.position = GeoPoint::new(
            (self.destination.lat - self.position.lat).mul_add(fraction, self.position.lat),
            (self.destination.lon - self.position.lon).mul_add(fraction, self.position.lon),
        );
        self.distance_flown_m += step_m;
        false
    }
}

/// A [`FrameSource`] producing seeded synthetic traffic forever.
#[derive(Debug)]
pub struct SyntheticHost {
    config: SyntheticConfig,
    rng: StdRng,
    step_secs: f64,
    sim_time: f64,
    next_serial: u64,
    airborne: BTreeMap<u64, Uav>,
    conflicts: PairGate,
    separations: PairGate,
}

impl SyntheticHost {
    /// Create a host that advances `step_secs` of simulation time per frame.
    pub fn new(config: SyntheticConfig, step_secs: f64) -> Self {
        info!(
            seed = config.seed,
            max_entities = config.max_entities,
            speed_mps = config.speed_mps,
            step_secs,
            "Synthetic host initialized"
        );
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            step_secs,
            sim_time: 0.0,
            next_serial: 1,
            airborne: BTreeMap::new(),
            conflicts: PairGate::new(),
            separations: PairGate::new(),
        }
    }

    fn random_point(&mut self) -> GeoPoint {
        let radius = self.config.area_radius_m * self.rng.random::<f64>().sqrt();
        let bearing = self.rng.random_range(0.0..core::f64::consts::TAU);
        let north_m = radius * bearing.cos();
        let east_m = radius * bearing.sin();
        let lat = self.config.center_lat + north_m / METERS_PER_DEGREE;
        let lon = self.config.center_lon
            + east_m / (METERS_PER_DEGREE * self.config.center_lat.to_radians().cos());
        GeoPoint::new(lat, lon)
    }

    fn maybe_spawn(&mut self) {
        if self.airborne.len() >= self.config.max_entities {
            return;
        }
        if !self.rng.random_bool(self.config.spawn_probability) {
            return;
        }
        let serial = self.next_serial;
        self.next_serial = serial.saturating_add(1);
        let uav = Uav {
            id: EntityId::new(format!("UAV{serial:03}")),
            position: self.random_point(),
            destination: self.random_point(),
            distance_flown_m: 0.0,
        };
        debug!(id = %uav.id, sim_time = self.sim_time, "UAV spawned");
        self.airborne.insert(serial, uav);
    }

    fn close_pairs(&self, radius_m: f64) -> Vec<EntityPair> {
        let uavs: Vec<&Uav> = self.airborne.values().collect();
        let mut pairs = Vec::new();
        for (i, a) in uavs.iter().enumerate() {
            for b in uavs.iter().skip(i.saturating_add(1)) {
                if geo::distance_between(a.position, b.position) < radius_m {
                    pairs.push(EntityPair::new(a.id.clone(), b.id.clone()));
                }
            }
        }
        pairs
    }

    /// Advance the traffic by one step and return the resulting frame.
    pub fn step(&mut self) -> TrafficFrame {
        self.sim_time += self.step_secs;
        let step_m = self.config.speed_mps * self.step_secs;

        let arrived: Vec<u64> = self
            .airborne
            .iter_mut()
            .filter_map(|(serial, uav)| uav.advance(step_m).then_some(*serial))
            .collect();
        for serial in arrived {
            if let Some(uav) = self.airborne.remove(&serial) {
                debug!(id = %uav.id, sim_time = self.sim_time, "UAV arrived and removed");
            }
        }

        self.maybe_spawn();

        let conflicts = self.conflicts.admit(self.close_pairs(self.config.conflict_radius_m));
        let separations = self
            .separations
            .admit(self.close_pairs(self.config.separation_radius_m));
        let entities = self.airborne.values().map(Uav::state).collect();

        TrafficFrame::new(self.sim_time, entities)
            .with_conflicts(conflicts)
            .with_separations(separations)
    }
}

impl FrameSource for SyntheticHost {
    fn next_frame(&mut self) -> Result<Option<TrafficFrame>, SourceError> {
        Ok(Some(self.step()))
    }
}
