//! MAVLink v2 framing for the messages the monitor consumes and emits.

use std::io::Cursor;

use mavlink::common::{
    MavAutopilot, MavCmd, MavMessage, MavModeFlag, MavState, MavType, COMMAND_LONG_DATA,
    HEARTBEAT_DATA,
};
use mavlink::error::{MessageReadError, MessageWriteError};
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;
use proximity_core::{AltitudeFix, GeoPosition, SystemId};

/// Largest MAVLink v2 frame (280 bytes); datagrams may carry several.
pub const MAX_FRAME_LEN: usize = 280;

/// MAV_COMP_ID_AUTOPILOT1
const AUTOPILOT_COMPONENT_ID: u8 = 1;

/// Degrees per unit of a `*_INT` lat/lon field.
const DEG_E7: f64 = 1e7;

/// Telemetry the monitor cares about, extracted from one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryUpdate {
    Position(GeoPosition),
    Altitude(AltitudeFix),
}

/// Decode every MAVLink v2 frame in a datagram, skipping corrupt ones.
pub fn decode_datagram(data: &[u8]) -> Vec<(MavHeader, MavMessage)> {
    let mut reader = PeekReader::new(Cursor::new(data));
    let mut frames = Vec::new();
    loop {
        match mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
            Ok(frame) => frames.push(frame),
            // End of datagram.
            Err(MessageReadError::Io(_)) => break,
            Err(err) => tracing::debug!("Skipping undecodable MAVLink frame: {err:?}"),
        }
    }
    frames
}

/// Map a frame to a position or altitude report.
///
/// `LOCAL_POSITION_NED` is down-positive, so altitude is `-z`.
pub fn telemetry_update(header: &MavHeader, message: &MavMessage) -> Option<TelemetryUpdate> {
    match message {
        MavMessage::GPS_RAW_INT(data) => Some(TelemetryUpdate::Position(GeoPosition::new(
            data.lat as f64 / DEG_E7,
            data.lon as f64 / DEG_E7,
        ))),
        MavMessage::GLOBAL_POSITION_INT(data) => Some(TelemetryUpdate::Position(GeoPosition::new(
            data.lat as f64 / DEG_E7,
            data.lon as f64 / DEG_E7,
        ))),
        MavMessage::LOCAL_POSITION_NED(data) => Some(TelemetryUpdate::Altitude(AltitudeFix::new(
            header.system_id,
            -(data.z as f64),
        ))),
        _ => None,
    }
}

/// `MAV_CMD_DO_SET_MODE` switching `target_system` to the given custom mode.
pub fn hold_command(target_system: SystemId, custom_mode: u32) -> MavMessage {
    MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        target_system,
        target_component: AUTOPILOT_COMPONENT_ID,
        command: MavCmd::MAV_CMD_DO_SET_MODE,
        confirmation: 0,
        param1: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED.bits() as f32,
        param2: custom_mode as f32,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
    })
}

/// Ground-station heartbeat announcing our endpoint to a vehicle.
pub fn gcs_heartbeat() -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: MavType::MAV_TYPE_GCS,
        autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
        base_mode: MavModeFlag::empty(),
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
    })
}

/// Serialize one frame as MAVLink v2.
pub fn encode(header: MavHeader, message: &MavMessage) -> Result<Vec<u8>, MessageWriteError> {
    let mut buf = Cursor::new(Vec::with_capacity(MAX_FRAME_LEN));
    mavlink::write_v2_msg(&mut buf, header, message)?;
    Ok(buf.into_inner())
}
