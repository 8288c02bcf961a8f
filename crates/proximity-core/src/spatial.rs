//! Spatial math for separation checks.

use crate::models::VehicleState;

/// Earth mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two lat/lon points (degrees).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Horizontal separation, or `None` unless both positions are known.
pub fn horizontal_distance(first: &VehicleState, second: &VehicleState) -> Option<f64> {
    let (p1, p2) = (first.position?, second.position?);
    Some(haversine_distance(p1.lat, p1.lon, p2.lat, p2.lon))
}

/// Vertical separation, or `None` unless both altitudes are known.
pub fn vertical_distance(first: &VehicleState, second: &VehicleState) -> Option<f64> {
    Some((first.altitude_m? - second.altitude_m?).abs())
}

/// Round to two decimals (centimeters) for reporting.
pub fn round_cm(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}
