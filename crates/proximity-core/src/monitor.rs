//! Proximity monitor orchestration.
//!
//! One monitor owns two telemetry links and the state gathered from them.
//! A cycle reads link 1 then link 2, merges whatever arrived into the
//! [`StateStore`], computes separation and classifies the pair. The
//! single-check path stops there; the continuous path also dispatches hold
//! commands on danger and repeats at a fixed cadence.

use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::dispatch::dispatch_holds;
use crate::error::ProximityError;
use crate::link::{LinkConnector, ReadMode, TelemetryLink};
use crate::models::{ProximityResult, ProximityStatus, Vehicle};
use crate::report::CycleReport;
use crate::rules::SeparationThresholds;
use crate::spatial::{horizontal_distance, round_cm, vertical_distance};
use crate::store::StateStore;

/// Default cadence of the continuous monitor (between cycle starts).
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(1);

/// Default per-link read budget for a single check.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// How a cycle polls its links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Poll {
    /// Each link gets one deadline shared by its position and altitude reads.
    Blocking(Duration),
    NonBlocking,
}

/// Proximity monitor for one pair of vehicles.
pub struct ProximityMonitor<L> {
    links: [L; 2],
    store: StateStore,
    thresholds: SeparationThresholds,
}

impl<L: TelemetryLink> ProximityMonitor<L> {
    /// Create a monitor over two already-open links.
    pub fn new(first: L, second: L, thresholds: SeparationThresholds) -> Self {
        Self {
            links: [first, second],
            store: StateStore::new(),
            thresholds,
        }
    }

    /// Open both links and build a monitor; fails fast if either link cannot be opened.
    pub async fn connect<C>(
        connector: &C,
        conn1: &str,
        conn2: &str,
        thresholds: SeparationThresholds,
    ) -> Result<Self, ProximityError>
    where
        C: LinkConnector<Link = L>,
    {
        if conn1.trim().is_empty() || conn2.trim().is_empty() {
            return Err(ProximityError::MissingConnection);
        }
        let first = connector.connect(conn1).await?;
        let second = match connector.connect(conn2).await {
            Ok(link) => link,
            Err(err) => {
                first.close().await;
                return Err(err.into());
            }
        };
        tracing::debug!(conn1, conn2, "Telemetry links open");
        Ok(Self::new(first, second, thresholds))
    }

    pub fn thresholds(&self) -> SeparationThresholds {
        self.thresholds
    }

    pub fn state(&self) -> &StateStore {
        &self.store
    }

    /// Run one blocking check and return the result without dispatching anything.
    ///
    /// Bounded by roughly twice `read_timeout`.
    pub async fn check_once(&mut self, read_timeout: Duration) -> ProximityResult {
        self.poll(Poll::Blocking(read_timeout)).await;
        self.evaluate()
    }

    /// Run one continuous-mode cycle: non-blocking reads, classify, hold on danger.
    pub async fn cycle(&mut self) -> CycleReport {
        self.poll(Poll::NonBlocking).await;
        let (result, horizontally_close) = self.assess();

        let actions = if result.is_danger() {
            tracing::warn!(
                sysid1 = ?result.sysid1,
                sysid2 = ?result.sysid2,
                horizontal_m = ?result.horizontal_distance_m,
                vertical_m = ?result.vertical_distance_m,
                "Separation minima violated"
            );
            dispatch_holds(&mut self.links, &self.store).await
        } else {
            Vec::new()
        };

        CycleReport {
            result,
            thresholds: self.thresholds,
            horizontally_close,
            actions,
        }
    }

    /// Repeat [`cycle`](Self::cycle) forever, starting one every `period`.
    ///
    /// Never returns on its own; callers that need to stop it race it against
    /// a shutdown signal or drop the future.
    pub async fn run<F>(&mut self, period: Duration, mut on_cycle: F)
    where
        F: FnMut(&CycleReport),
    {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let report = self.cycle().await;
            on_cycle(&report);
        }
    }

    /// Compute and classify from the current state.
    pub fn evaluate(&self) -> ProximityResult {
        self.assess().0
    }

    /// Shut both links down, waiting until their endpoints are released.
    pub async fn close(self) {
        let [first, second] = self.links;
        first.close().await;
        second.close().await;
    }

    /// Classify the pair and report whether the unrounded horizontal
    /// distance is inside the minimum.
    fn assess(&self) -> (ProximityResult, bool) {
        let (first, second) = self.store.pair();
        let horizontal = horizontal_distance(first, second);
        let vertical = vertical_distance(first, second);
        let status = self.thresholds.classify(horizontal, vertical);
        let horizontally_close =
            horizontal.is_some_and(|h| self.thresholds.is_horizontally_close(h));

        if status == ProximityStatus::NoData {
            tracing::debug!("Waiting for both positions");
        }

        let result = ProximityResult {
            horizontal_distance_m: horizontal.map(round_cm),
            vertical_distance_m: vertical.map(round_cm),
            status,
            sysid1: first.system_id,
            sysid2: second.system_id,
        };
        (result, horizontally_close)
    }

    async fn poll(&mut self, poll: Poll) {
        for vehicle in Vehicle::BOTH {
            let link = &mut self.links[vehicle.index()];
            let (position, altitude) = match poll {
                Poll::NonBlocking => (
                    link.receive_position(ReadMode::NonBlocking).await,
                    link.receive_altitude(ReadMode::NonBlocking).await,
                ),
                Poll::Blocking(budget) => {
                    let deadline = Instant::now() + budget;
                    let position = link.receive_position(remaining(deadline)).await;
                    let altitude = link.receive_altitude(remaining(deadline)).await;
                    (position, altitude)
                }
            };
            tracing::trace!(?vehicle, ?position, ?altitude, "Polled link");
            self.store.update(vehicle, position, altitude);
        }
    }
}

fn remaining(deadline: Instant) -> ReadMode {
    ReadMode::Blocking(deadline.saturating_duration_since(Instant::now()))
}
