//! Telemetry link capability consumed by the monitor.
//!
//! The monitor never talks to a transport directly. It asks a link for the
//! latest position or altitude report and hands it hold commands; the MAVLink
//! adapter and the scripted test link both implement this trait.

use std::future::Future;
use std::time::Duration;

use crate::error::LinkError;
use crate::models::{AltitudeFix, GeoPosition, SystemId};

/// How long a read may wait for a new report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Wait up to the given duration for a report that has not been read yet.
    Blocking(Duration),
    /// Return immediately with whatever unread report is already buffered.
    NonBlocking,
}

/// Bidirectional channel to one vehicle.
///
/// Each report is handed out at most once; reading again without new traffic
/// yields `None`.
pub trait TelemetryLink {
    /// Most recent global-position report (lat/lon in degrees).
    fn receive_position(
        &mut self,
        mode: ReadMode,
    ) -> impl Future<Output = Option<GeoPosition>> + Send;

    /// Most recent local-position report, altitude normalized to positive up.
    fn receive_altitude(
        &mut self,
        mode: ReadMode,
    ) -> impl Future<Output = Option<AltitudeFix>> + Send;

    /// Ask the vehicle to switch to a position-hold mode.
    ///
    /// Fire-and-forget: nothing waits for an acknowledgment and a failed send
    /// is not reported to the caller.
    fn send_hold_command(&mut self, system_id: SystemId) -> impl Future<Output = ()> + Send;

    /// Shut the link down. Once this resolves the endpoint can be reopened.
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}

/// Opens telemetry links from connection strings.
pub trait LinkConnector: Send + Sync + 'static {
    type Link: TelemetryLink + Send + 'static;

    fn connect(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Self::Link, LinkError>> + Send;
}
