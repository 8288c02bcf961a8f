//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use proximity_core::SeparationThresholds;
use proximity_link::MavlinkConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Per-link read budget for a single check
    pub read_timeout: Duration,
    /// Thresholds used when a request omits hthresh/vthresh
    pub default_thresholds: SeparationThresholds,
    pub mavlink: MavlinkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            read_timeout: proximity_core::DEFAULT_READ_TIMEOUT,
            default_thresholds: SeparationThresholds::default(),
            mavlink: MavlinkConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_thresholds = SeparationThresholds::new(
            env_or("PROXIMITY_H_THRESHOLD_M", defaults.default_thresholds.horizontal_m),
            env_or("PROXIMITY_V_THRESHOLD_M", defaults.default_thresholds.vertical_m),
        )
        .unwrap_or_else(|err| {
            tracing::warn!("Ignoring configured thresholds: {err}");
            defaults.default_thresholds
        });

        Self {
            server_port: env_or("PROXIMITY_PORT", defaults.server_port),
            read_timeout: Duration::from_millis(env_or(
                "PROXIMITY_READ_TIMEOUT_MS",
                defaults.read_timeout.as_millis() as u64,
            )),
            default_thresholds,
            mavlink: MavlinkConfig {
                gcs_system_id: env_or("PROXIMITY_GCS_SYSTEM_ID", defaults.mavlink.gcs_system_id),
                hold_custom_mode: env_or("PROXIMITY_HOLD_MODE", defaults.mavlink.hold_custom_mode),
                ..defaults.mavlink
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.default_thresholds, SeparationThresholds::default());
        assert_eq!(config.mavlink.hold_custom_mode, 5);
    }

    #[test]
    fn env_or_falls_back_when_unset() {
        assert_eq!(env_or("PROXIMITY_TEST_UNSET_KEY", 42u16), 42);
    }

    #[test]
    fn env_or_falls_back_on_garbage() {
        env::set_var("PROXIMITY_TEST_GARBAGE_PORT", "not-a-port");
        assert_eq!(env_or("PROXIMITY_TEST_GARBAGE_PORT", 8000u16), 8000);

        env::set_var("PROXIMITY_TEST_PADDED_PORT", " 9100 ");
        assert_eq!(env_or("PROXIMITY_TEST_PADDED_PORT", 8000u16), 9100);
    }
}
