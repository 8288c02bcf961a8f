//! Connection string parsing.

use proximity_core::LinkError;

/// A UDP MAVLink endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAddress {
    /// Listen on `host:port`; the vehicle endpoint is learned from traffic.
    UdpIn(String),
    /// Send to the vehicle at `host:port` from an ephemeral local port.
    UdpOut(String),
}

impl LinkAddress {
    /// Parse `udpin:`, `udp:` (same as `udpin:`) or `udpout:` followed by `HOST:PORT`.
    pub fn parse(address: &str) -> Result<Self, LinkError> {
        let unsupported = || LinkError::UnsupportedAddress(address.to_string());

        let (scheme, endpoint) = address.trim().split_once(':').ok_or_else(unsupported)?;
        let (host, port) = endpoint.rsplit_once(':').ok_or_else(unsupported)?;
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(unsupported());
        }

        match scheme.to_ascii_lowercase().as_str() {
            "udpin" | "udp" => Ok(Self::UdpIn(endpoint.to_string())),
            "udpout" => Ok(Self::UdpOut(endpoint.to_string())),
            _ => Err(unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listen_aliases() {
        assert_eq!(
            LinkAddress::parse("udp:127.0.0.1:14540").unwrap(),
            LinkAddress::UdpIn("127.0.0.1:14540".into())
        );
        assert_eq!(
            LinkAddress::parse("udpin:0.0.0.0:14550").unwrap(),
            LinkAddress::UdpIn("0.0.0.0:14550".into())
        );
    }

    #[test]
    fn parses_outbound() {
        assert_eq!(
            LinkAddress::parse("udpout:drone.local:14555").unwrap(),
            LinkAddress::UdpOut("drone.local:14555".into())
        );
    }

    #[test]
    fn rejects_unsupported_transports() {
        for address in ["tcp:127.0.0.1:5760", "serial:/dev/ttyUSB0:57600", "127.0.0.1:14540"] {
            assert!(
                matches!(LinkAddress::parse(address), Err(LinkError::UnsupportedAddress(_))),
                "{address} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_malformed_endpoints() {
        for address in ["udp:", "udp:127.0.0.1", "udp::14540", "udpin:host:notaport"] {
            assert!(LinkAddress::parse(address).is_err(), "{address} should be rejected");
        }
    }
}
