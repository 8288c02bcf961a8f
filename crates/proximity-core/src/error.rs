//! Error types shared by the monitor and its links.

use thiserror::Error;

/// Failure to establish a telemetry link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unsupported connection string `{0}` (expected udpin:, udp: or udpout:HOST:PORT)")]
    UnsupportedAddress(String),

    #[error("failed to open telemetry link `{address}`: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no telemetry link registered for `{0}`")]
    UnknownEndpoint(String),
}

/// Errors raised while setting up a proximity check.
#[derive(Debug, Error)]
pub enum ProximityError {
    #[error("Missing required query params: conn1 and conn2")]
    MissingConnection,

    #[error("Invalid {name}: {value} (must be a finite, non-negative number of meters)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error(transparent)]
    Link(#[from] LinkError),
}
