//! Core data models for the proximity monitor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MAVLink system identifier of a vehicle.
pub type SystemId = u8;

/// Which of the two monitored vehicles (and its link) a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vehicle {
    First,
    Second,
}

impl Vehicle {
    pub const BOTH: [Vehicle; 2] = [Vehicle::First, Vehicle::Second];

    pub(crate) fn index(self) -> usize {
        match self {
            Vehicle::First => 0,
            Vehicle::Second => 1,
        }
    }
}

/// Latitude/longitude fix in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Local-position report: reporting system plus altitude, positive up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeFix {
    pub system_id: SystemId,
    pub altitude_m: f64,
}

impl AltitudeFix {
    pub fn new(system_id: SystemId, altitude_m: f64) -> Self {
        Self {
            system_id,
            altitude_m,
        }
    }
}

/// Latest known state of one monitored vehicle.
///
/// Fields are only ever replaced, never cleared: a cycle that brings no new
/// report leaves the previous value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub system_id: Option<SystemId>,
    pub position: Option<GeoPosition>,
    /// Altitude in meters, positive up
    pub altitude_m: Option<f64>,
    pub last_update: Option<DateTime<Utc>>,
}

impl VehicleState {
    /// Merge whichever reports arrived this cycle.
    pub fn apply(&mut self, position: Option<GeoPosition>, altitude: Option<AltitudeFix>) {
        if position.is_none() && altitude.is_none() {
            return;
        }
        if let Some(position) = position {
            self.position = Some(position);
        }
        if let Some(fix) = altitude {
            self.system_id = Some(fix.system_id);
            self.altitude_m = Some(fix.altitude_m);
        }
        self.last_update = Some(Utc::now());
    }
}

/// Safety classification of the monitored pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximityStatus {
    /// At least one vehicle has never reported a position
    #[serde(rename = "NO DATA")]
    NoData,
    #[serde(rename = "SAFE")]
    Safe,
    /// Both horizontal and vertical separation minima are violated
    #[serde(rename = "DANGER")]
    Danger,
}

impl fmt::Display for ProximityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProximityStatus::NoData => "NO DATA",
            ProximityStatus::Safe => "SAFE",
            ProximityStatus::Danger => "DANGER",
        };
        f.write_str(label)
    }
}

/// Outcome of one proximity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    /// Great-circle distance, rounded to centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_distance_m: Option<f64>,
    /// Altitude difference, rounded to centimeters; null unless both altitudes are known
    #[serde(default)]
    pub vertical_distance_m: Option<f64>,
    pub status: ProximityStatus,
    #[serde(default)]
    pub sysid1: Option<SystemId>,
    #[serde(default)]
    pub sysid2: Option<SystemId>,
}

impl ProximityResult {
    pub fn is_danger(&self) -> bool {
        self.status == ProximityStatus::Danger
    }
}

/// A hold command handed to one vehicle's link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldAction {
    pub vehicle: Vehicle,
    pub system_id: SystemId,
}
