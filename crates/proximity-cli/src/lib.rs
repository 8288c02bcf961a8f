//! Command-line front end for the continuous proximity monitor.

use std::time::Duration;

use clap::Parser;
use proximity_core::{ProximityError, SeparationThresholds};
use proximity_link::MavlinkConfig;

/// Watch two drones and command both to hold when they get too close
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about)]
pub struct Args {
    /// Telemetry link for the first drone (udpin:, udp: or udpout:HOST:PORT)
    #[arg(long, default_value = "udp:127.0.0.1:14540")]
    pub conn1: String,

    /// Telemetry link for the second drone
    #[arg(long, default_value = "udp:127.0.0.1:14541")]
    pub conn2: String,

    /// Horizontal separation minimum in meters
    #[arg(long, default_value_t = proximity_core::rules::DEFAULT_HORIZONTAL_THRESHOLD_M)]
    pub hthresh: f64,

    /// Vertical separation minimum in meters
    #[arg(long, default_value_t = proximity_core::rules::DEFAULT_VERTICAL_THRESHOLD_M)]
    pub vthresh: f64,

    /// Time between cycle starts in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,

    /// Custom flight mode sent as the hold command
    #[arg(long, default_value_t = 5)]
    pub hold_mode: u32,
}

impl Args {
    pub fn thresholds(&self) -> Result<SeparationThresholds, ProximityError> {
        SeparationThresholds::new(self.hthresh, self.vthresh)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn mavlink_config(&self) -> MavlinkConfig {
        MavlinkConfig {
            hold_custom_mode: self.hold_mode,
            ..MavlinkConfig::default()
        }
    }
}
