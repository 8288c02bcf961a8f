//! MAVLink-over-UDP telemetry link.
//!
//! A background task owns the receive side of the socket, decodes frames and
//! publishes the latest position and altitude reports on watch channels. The
//! monitor-facing side only looks at those channels, so reads never touch
//! the socket and a blocking read is just a bounded wait for the next
//! publish.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use mavlink::MavHeader;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use proximity_core::{AltitudeFix, GeoPosition, LinkConnector, LinkError, ReadMode, SystemId, TelemetryLink};

use crate::address::LinkAddress;
use crate::codec::{self, TelemetryUpdate, MAX_FRAME_LEN};

/// Largest UDP payload we expect from a vehicle.
const RECV_BUFFER_LEN: usize = 8 * MAX_FRAME_LEN;

/// Identity and command settings for the ground-station side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MavlinkConfig {
    /// System id we send as (255 is the usual GCS id)
    pub gcs_system_id: u8,
    /// MAV_COMP_ID_MISSIONPLANNER
    pub gcs_component_id: u8,
    /// Custom flight mode requested by hold commands (5 = LOITER)
    pub hold_custom_mode: u32,
}

impl Default for MavlinkConfig {
    fn default() -> Self {
        Self {
            gcs_system_id: 255,
            gcs_component_id: 190,
            hold_custom_mode: 5,
        }
    }
}

/// Telemetry link to one vehicle over UDP.
pub struct MavlinkLink {
    address: String,
    config: MavlinkConfig,
    socket: Arc<UdpSocket>,
    peer: watch::Receiver<Option<SocketAddr>>,
    positions: watch::Receiver<Option<GeoPosition>>,
    altitudes: watch::Receiver<Option<AltitudeFix>>,
    sequence: u8,
    /// `None` once the link has been closed
    receiver: Option<JoinHandle<()>>,
}

impl MavlinkLink {
    /// Open the endpoint named by `address` and start receiving.
    pub async fn connect(address: &str, config: MavlinkConfig) -> Result<Self, LinkError> {
        let connect_err = |source: io::Error| LinkError::Connect {
            address: address.to_string(),
            source,
        };

        let (socket, peer, follow_sender) = match LinkAddress::parse(address)? {
            LinkAddress::UdpIn(endpoint) => {
                let socket = UdpSocket::bind(endpoint.as_str()).await.map_err(connect_err)?;
                (socket, None, true)
            }
            LinkAddress::UdpOut(endpoint) => {
                let target = tokio::net::lookup_host(endpoint.as_str())
                    .await
                    .map_err(connect_err)?
                    .next()
                    .ok_or_else(|| {
                        connect_err(io::Error::new(
                            io::ErrorKind::NotFound,
                            format!("{endpoint} did not resolve"),
                        ))
                    })?;
                let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
                let socket = UdpSocket::bind(local).await.map_err(connect_err)?;
                (socket, Some(target), false)
            }
        };

        let socket = Arc::new(socket);
        let (peer_tx, peer_rx) = watch::channel(peer);
        let (position_tx, position_rx) = watch::channel(None);
        let (altitude_tx, altitude_rx) = watch::channel(None);

        let receiver = tokio::spawn(receive_loop(
            socket.clone(),
            address.to_string(),
            follow_sender,
            peer_tx,
            position_tx,
            altitude_tx,
        ));

        let mut link = Self {
            address: address.to_string(),
            config,
            socket,
            peer: peer_rx,
            positions: position_rx,
            altitudes: altitude_rx,
            sequence: 0,
            receiver: Some(receiver),
        };

        if peer.is_some() {
            // Outbound links announce themselves so the vehicle learns where to stream.
            link.send(&codec::gcs_heartbeat()).await;
        }
        tracing::info!(address, local = ?link.local_addr().ok(), "Telemetry link open");
        Ok(link)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Vehicle endpoint, once known.
    pub fn peer(&self) -> Option<SocketAddr> {
        *self.peer.borrow()
    }

    /// Stop the receive task and release the socket.
    ///
    /// Unlike a plain drop this waits for the task to finish, so the bound
    /// port is free again when it returns.
    pub async fn close(mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.abort();
            // Resolves once the task's future (and its socket handle) is dropped.
            let _ = receiver.await;
        }
        tracing::debug!(address = %self.address, "Telemetry link closed");
    }

    async fn send(&mut self, message: &mavlink::common::MavMessage) {
        let Some(peer) = self.peer() else {
            tracing::warn!(address = %self.address, "No vehicle endpoint yet, dropping command");
            return;
        };

        let header = MavHeader {
            system_id: self.config.gcs_system_id,
            component_id: self.config.gcs_component_id,
            sequence: self.sequence,
        };
        self.sequence = self.sequence.wrapping_add(1);

        let bytes = match codec::encode(header, message) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(address = %self.address, "Failed to encode MAVLink frame: {err:?}");
                return;
            }
        };
        if let Err(err) = self.socket.send_to(&bytes, peer).await {
            tracing::warn!(address = %self.address, %peer, "Failed to send MAVLink frame: {err}");
        }
    }
}

impl Drop for MavlinkLink {
    fn drop(&mut self) {
        if let Some(receiver) = &self.receiver {
            receiver.abort();
        }
    }
}

impl TelemetryLink for MavlinkLink {
    async fn receive_position(&mut self, mode: ReadMode) -> Option<GeoPosition> {
        next_report(&mut self.positions, mode).await
    }

    async fn receive_altitude(&mut self, mode: ReadMode) -> Option<AltitudeFix> {
        next_report(&mut self.altitudes, mode).await
    }

    async fn send_hold_command(&mut self, system_id: SystemId) {
        let command = codec::hold_command(system_id, self.config.hold_custom_mode);
        self.send(&command).await;
    }

    async fn close(self) {
        MavlinkLink::close(self).await;
    }
}

/// Opens [`MavlinkLink`]s with a shared configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MavlinkConnector {
    config: MavlinkConfig,
}

impl MavlinkConnector {
    pub fn new(config: MavlinkConfig) -> Self {
        Self { config }
    }
}

impl LinkConnector for MavlinkConnector {
    type Link = MavlinkLink;

    async fn connect(&self, address: &str) -> Result<MavlinkLink, LinkError> {
        MavlinkLink::connect(address, self.config).await
    }
}

/// Take the latest unread report, waiting for one if the mode allows.
async fn next_report<T: Clone>(rx: &mut watch::Receiver<Option<T>>, mode: ReadMode) -> Option<T> {
    let fresh = match (rx.has_changed(), mode) {
        (Ok(true), _) => true,
        (Ok(false), ReadMode::Blocking(wait)) => {
            matches!(tokio::time::timeout(wait, rx.changed()).await, Ok(Ok(())))
        }
        // Nothing buffered, or the receive task is gone.
        (Ok(false), ReadMode::NonBlocking) | (Err(_), _) => false,
    };
    if fresh {
        rx.borrow_and_update().clone()
    } else {
        None
    }
}

/// Inbound links (`follow_sender`) reply to whoever sent last, so a vehicle
/// that restarts on a new source port keeps receiving commands.
async fn receive_loop(
    socket: Arc<UdpSocket>,
    address: String,
    follow_sender: bool,
    peer: watch::Sender<Option<SocketAddr>>,
    positions: watch::Sender<Option<GeoPosition>>,
    altitudes: watch::Sender<Option<AltitudeFix>>,
) {
    let mut buf = vec![0u8; RECV_BUFFER_LEN];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(err) => {
                // ICMP port-unreachable and friends surface here; keep listening.
                tracing::debug!(%address, "UDP receive failed: {err}");
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                continue;
            }
        };

        if follow_sender {
            peer.send_if_modified(|current| {
                let previous = current.replace(from);
                if previous == Some(from) {
                    return false;
                }
                tracing::info!(%address, %from, ?previous, "Vehicle endpoint discovered");
                true
            });
        }

        for (header, message) in codec::decode_datagram(&buf[..len]) {
            match codec::telemetry_update(&header, &message) {
                Some(TelemetryUpdate::Position(position)) => {
                    positions.send_replace(Some(position));
                }
                Some(TelemetryUpdate::Altitude(fix)) => {
                    altitudes.send_replace(Some(fix));
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlink::common::{MavMessage, GPS_RAW_INT_DATA, LOCAL_POSITION_NED_DATA};
    use proximity_core::{ProximityMonitor, SeparationThresholds};
    use std::time::Duration;

    fn vehicle_frames(system_id: u8, lat: f64, lon: f64, z: f32) -> Vec<u8> {
        let header = MavHeader {
            system_id,
            component_id: 1,
            sequence: 0,
        };
        let gps = MavMessage::GPS_RAW_INT(GPS_RAW_INT_DATA {
            lat: (lat * 1e7) as i32,
            lon: (lon * 1e7) as i32,
            ..Default::default()
        });
        let ned = MavMessage::LOCAL_POSITION_NED(LOCAL_POSITION_NED_DATA {
            time_boot_ms: 0,
            x: 0.0,
            y: 0.0,
            z,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
        });
        let mut bytes = codec::encode(header, &gps).unwrap();
        bytes.extend(codec::encode(header, &ned).unwrap());
        bytes
    }

    /// Connection string for a loopback port that was free a moment ago.
    fn free_udpin() -> String {
        let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        format!("udpin:{}", socket.local_addr().unwrap())
    }

    async fn listening_link() -> MavlinkLink {
        MavlinkLink::connect("udpin:127.0.0.1:0", MavlinkConfig::default())
            .await
            .expect("bind loopback")
    }

    #[tokio::test]
    async fn receives_reports_and_sends_hold_back() {
        let mut link = listening_link().await;
        let link_addr = link.local_addr().unwrap();

        let vehicle = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        vehicle
            .send_to(&vehicle_frames(3, 0.0, 0.0001, -42.0), link_addr)
            .await
            .unwrap();

        let wait = ReadMode::Blocking(Duration::from_secs(2));
        let position = link.receive_position(wait).await.expect("position");
        assert!((position.lon - 0.0001).abs() < 1e-7);

        let fix = link.receive_altitude(wait).await.expect("altitude");
        assert_eq!(fix, AltitudeFix::new(3, 42.0));
        assert_eq!(link.peer(), Some(vehicle.local_addr().unwrap()));

        link.send_hold_command(3).await;
        let mut buf = vec![0u8; RECV_BUFFER_LEN];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), vehicle.recv_from(&mut buf))
            .await
            .expect("hold command in time")
            .unwrap();
        let frames = codec::decode_datagram(&buf[..len]);
        let Some((header, MavMessage::COMMAND_LONG(cmd))) = frames.first() else {
            panic!("expected COMMAND_LONG");
        };
        assert_eq!(header.system_id, 255);
        assert_eq!(cmd.target_system, 3);
        assert_eq!(cmd.param2, 5.0);
    }

    #[tokio::test]
    async fn report_is_handed_out_once() {
        let mut link = listening_link().await;
        let vehicle = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        vehicle
            .send_to(&vehicle_frames(1, 1.0, 1.0, -5.0), link.local_addr().unwrap())
            .await
            .unwrap();

        let wait = ReadMode::Blocking(Duration::from_secs(2));
        assert!(link.receive_position(wait).await.is_some());
        assert!(link.receive_position(ReadMode::NonBlocking).await.is_none());
        assert!(link
            .receive_position(ReadMode::Blocking(Duration::from_millis(50)))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn hold_follows_most_recent_sender() {
        let mut link = listening_link().await;
        let link_addr = link.local_addr().unwrap();
        let wait = ReadMode::Blocking(Duration::from_secs(2));

        let old = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        old.send_to(&vehicle_frames(3, 0.0, 0.0, -10.0), link_addr).await.unwrap();
        assert!(link.receive_position(wait).await.is_some());
        assert_eq!(link.peer(), Some(old.local_addr().unwrap()));

        // Vehicle restarts and streams from a new source port.
        let restarted = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        restarted.send_to(&vehicle_frames(3, 0.0, 0.0, -10.0), link_addr).await.unwrap();
        assert!(link.receive_position(wait).await.is_some());
        assert_eq!(link.peer(), Some(restarted.local_addr().unwrap()));

        link.send_hold_command(3).await;
        let mut buf = vec![0u8; RECV_BUFFER_LEN];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), restarted.recv_from(&mut buf))
            .await
            .expect("hold command in time")
            .unwrap();
        let frames = codec::decode_datagram(&buf[..len]);
        assert!(matches!(frames.first(), Some((_, MavMessage::COMMAND_LONG(_)))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn closed_link_port_can_be_reopened_at_once() {
        let (conn1, conn2) = (free_udpin(), free_udpin());
        let connector = MavlinkConnector::default();

        for round in 0..30 {
            let mut monitor = ProximityMonitor::connect(
                &connector,
                &conn1,
                &conn2,
                SeparationThresholds::default(),
            )
            .await
            .unwrap_or_else(|err| panic!("round {round}: {err}"));
            monitor.check_once(Duration::from_millis(1)).await;
            monitor.close().await;
        }
    }

    #[tokio::test]
    async fn closing_one_link_frees_its_port() {
        let link = listening_link().await;
        let address = format!("udpin:{}", link.local_addr().unwrap());
        link.close().await;

        let reopened = MavlinkConnector::default().connect(&address).await;
        assert!(reopened.is_ok());
    }

    #[tokio::test]
    async fn non_blocking_read_without_traffic_is_empty() {
        let mut link = listening_link().await;
        assert!(link.receive_position(ReadMode::NonBlocking).await.is_none());
        assert!(link.receive_altitude(ReadMode::NonBlocking).await.is_none());
    }

    #[tokio::test]
    async fn hold_without_known_vehicle_is_dropped_quietly() {
        let mut link = listening_link().await;
        link.send_hold_command(1).await;
        assert_eq!(link.peer(), None);
    }

    #[tokio::test]
    async fn outbound_link_announces_itself() {
        let vehicle = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = format!("udpout:{}", vehicle.local_addr().unwrap());

        let link = MavlinkLink::connect(&address, MavlinkConfig::default()).await.unwrap();
        assert_eq!(link.peer(), Some(vehicle.local_addr().unwrap()));

        let mut buf = vec![0u8; RECV_BUFFER_LEN];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), vehicle.recv_from(&mut buf))
            .await
            .expect("heartbeat in time")
            .unwrap();
        let frames = codec::decode_datagram(&buf[..len]);
        assert!(matches!(frames.first(), Some((_, MavMessage::HEARTBEAT(_)))));
    }

    #[tokio::test]
    async fn busy_port_fails_fast() {
        let first = listening_link().await;
        let taken = format!("udpin:{}", first.local_addr().unwrap());

        let err = MavlinkConnector::default().connect(&taken).await.err().expect("port in use");
        assert!(matches!(err, LinkError::Connect { .. }));
    }

    #[tokio::test]
    async fn unsupported_transport_is_rejected() {
        let err = MavlinkConnector::default()
            .connect("tcp:127.0.0.1:5760")
            .await
            .err()
            .expect("tcp is not supported");
        assert!(matches!(err, LinkError::UnsupportedAddress(_)));
    }
}
