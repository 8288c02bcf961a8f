//! MAVLink telemetry link for the proximity monitor.
//!
//! Implements the core's [`TelemetryLink`](proximity_core::TelemetryLink)
//! over UDP: `GPS_RAW_INT`/`GLOBAL_POSITION_INT` become position reports,
//! `LOCAL_POSITION_NED` becomes a positive-up altitude report, and hold
//! requests go out as `MAV_CMD_DO_SET_MODE`.

pub mod address;
pub mod codec;
pub mod udp;

pub use address::LinkAddress;
pub use udp::{MavlinkConfig, MavlinkConnector, MavlinkLink};
