//! Great-circle distance on a spherical Earth.
//!
//! Distances use the haversine formula with a fixed mean Earth radius. The
//! functions are pure and deterministic.
//!
//! # Input validation
//!
//! Coordinates are **not** validated here. Host positions are passed through
//! as supplied; out-of-range or non-finite input produces a meaningless
//! (possibly NaN) result. Callers that need guarantees must validate first,
//! as destination ingestion does via [`GeoPoint::checked`].

use aerolog_types::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two latitude/longitude pairs
/// given in degrees.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let half_dphi = (lat2 - lat1).to_radians() / 2.0;
    let half_dlambda = (lon2 - lon1).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    // Rounding can push h marginally outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in meters between two points.
pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    distance(a.lat, a.lon, b.lat, b.lon)
}
