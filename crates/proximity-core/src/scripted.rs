//! Scripted in-memory links for deterministic monitor tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::LinkError;
use crate::link::{LinkConnector, ReadMode, TelemetryLink};
use crate::models::{AltitudeFix, GeoPosition, SystemId};

#[derive(Debug, Default)]
struct Script {
    positions: VecDeque<Option<GeoPosition>>,
    altitudes: VecDeque<Option<AltitudeFix>>,
    holds: Vec<SystemId>,
    reads: Vec<ReadMode>,
    closed: bool,
}

/// A link that replays queued reports, one per read.
///
/// Clones share the same script, so a test can keep a handle after moving
/// the link into a monitor.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLink {
    script: Arc<Mutex<Script>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for one future position read (`None` = nothing arrived).
    pub fn push_position(&self, position: Option<GeoPosition>) -> &Self {
        self.lock().positions.push_back(position);
        self
    }

    /// Queue the answer for one future altitude read (`None` = nothing arrived).
    pub fn push_altitude(&self, altitude: Option<AltitudeFix>) -> &Self {
        self.lock().altitudes.push_back(altitude);
        self
    }

    /// System ids that received a hold command, in order.
    pub fn holds(&self) -> Vec<SystemId> {
        self.lock().holds.clone()
    }

    /// Read modes the monitor used, in order.
    pub fn reads(&self) -> Vec<ReadMode> {
        self.lock().reads.clone()
    }

    /// Whether the monitor closed this link.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetryLink for ScriptedLink {
    async fn receive_position(&mut self, mode: ReadMode) -> Option<GeoPosition> {
        let mut script = self.lock();
        script.reads.push(mode);
        script.positions.pop_front().flatten()
    }

    async fn receive_altitude(&mut self, mode: ReadMode) -> Option<AltitudeFix> {
        let mut script = self.lock();
        script.reads.push(mode);
        script.altitudes.pop_front().flatten()
    }

    async fn send_hold_command(&mut self, system_id: SystemId) {
        self.lock().holds.push(system_id);
    }

    async fn close(self) {
        self.lock().closed = true;
    }
}

/// Hands out registered scripted links by connection string.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    links: HashMap<String, ScriptedLink>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, address: impl Into<String>, link: ScriptedLink) -> Self {
        self.links.insert(address.into(), link);
        self
    }
}

impl LinkConnector for ScriptedConnector {
    type Link = ScriptedLink;

    async fn connect(&self, address: &str) -> Result<ScriptedLink, LinkError> {
        self.links
            .get(address)
            .cloned()
            .ok_or_else(|| LinkError::UnknownEndpoint(address.to_string()))
    }
}
