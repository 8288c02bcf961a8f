//! Proximity monitoring core for a pair of drones.
//!
//! Ingests position and altitude reports from two telemetry links, keeps the
//! latest state of each vehicle, computes horizontal and vertical separation,
//! classifies the pair and issues hold commands when both minima are violated.

pub mod dispatch;
pub mod error;
pub mod link;
pub mod models;
pub mod monitor;
pub mod report;
pub mod rules;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
pub mod spatial;
pub mod store;

pub use error::{LinkError, ProximityError};
pub use link::{LinkConnector, ReadMode, TelemetryLink};
pub use models::{
    AltitudeFix, GeoPosition, HoldAction, ProximityResult, ProximityStatus, SystemId, Vehicle,
    VehicleState,
};
pub use monitor::{ProximityMonitor, DEFAULT_CYCLE_INTERVAL, DEFAULT_READ_TIMEOUT};
pub use report::CycleReport;
pub use rules::SeparationThresholds;
pub use spatial::haversine_distance;
pub use store::StateStore;
