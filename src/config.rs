//! Capture configuration.

use std::fmt;

use crate::domain::TransportProtocol;
use crate::error::ConfigError;

/// Set of transport protocols to open raw sockets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolMask(u8);

impl ProtocolMask {
    pub const NONE: ProtocolMask = ProtocolMask(0);
    pub const UDP: ProtocolMask = ProtocolMask(1 << 0);
    pub const TCP: ProtocolMask = ProtocolMask(1 << 1);
    pub const ALL: ProtocolMask = ProtocolMask(Self::UDP.0 | Self::TCP.0);

    fn bit(protocol: TransportProtocol) -> u8 {
        match protocol {
            TransportProtocol::Udp => Self::UDP.0,
            TransportProtocol::Tcp => Self::TCP.0,
        }
    }

    /// Build a mask from a list of protocols. An empty list selects every protocol.
    pub fn from_protocols(protocols: &[TransportProtocol]) -> Self {
        if protocols.is_empty() {
            return Self::ALL;
        }
        protocols
            .iter()
            .fold(Self::NONE, |mask, &protocol| mask.with(protocol))
    }

    pub fn with(self, protocol: TransportProtocol) -> Self {
        Self(self.0 | Self::bit(protocol))
    }

    pub fn contains(self, protocol: TransportProtocol) -> bool {
        self.0 & Self::bit(protocol) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled protocols in socket creation order.
    pub fn iter(self) -> impl Iterator<Item = TransportProtocol> {
        TransportProtocol::ALL
            .into_iter()
            .filter(move |&protocol| self.contains(protocol))
    }
}

impl Default for ProtocolMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ProtocolMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(TransportProtocol::name).collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(","))
        }
    }
}

/// What to capture and which packets to count.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Destination port filter; `None` accepts every port
    pub port: Option<u16>,
    /// Protocols to open sockets for
    pub protocols: ProtocolMask,
    /// Byte string that must occur in the payload; `None` accepts every payload
    pub word_filter: Option<Vec<u8>>,
    /// Device every socket is bound to; `None` listens on all devices
    pub interface: Option<String>,
}

impl CaptureConfig {
    /// Configuration that captures everything on every protocol.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_protocols(mut self, protocols: ProtocolMask) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn with_word_filter(mut self, word: Option<impl Into<Vec<u8>>>) -> Self {
        self.word_filter = word.map(Into::into);
        self
    }

    pub fn with_interface(mut self, interface: Option<String>) -> Self {
        self.interface = interface;
        self
    }

    /// Reject configurations the capture core cannot run with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.protocols.is_empty() {
            return Err(ConfigError::NoProtocols);
        }
        Ok(self)
    }
}

/// Parse a destination port argument.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_captures_everything() {
        let config = CaptureConfig::new();
        assert_eq!(config.port, None);
        assert_eq!(config.protocols, ProtocolMask::ALL);
        assert_eq!(config.word_filter, None);
        assert_eq!(config.interface, None);
    }

    #[test]
    fn test_builder() {
        let config = CaptureConfig::new()
            .with_port(Some(53))
            .with_protocols(ProtocolMask::UDP)
            .with_word_filter(Some("GET"))
            .with_interface(Some("eth0".to_string()));

        assert_eq!(config.port, Some(53));
        assert!(config.protocols.contains(TransportProtocol::Udp));
        assert!(!config.protocols.contains(TransportProtocol::Tcp));
        assert_eq!(config.word_filter.as_deref(), Some(&b"GET"[..]));
        assert_eq!(config.interface.as_deref(), Some("eth0"));
    }

    #[test]
    fn test_mask_from_protocols() {
        assert_eq!(ProtocolMask::from_protocols(&[]), ProtocolMask::ALL);
        assert_eq!(
            ProtocolMask::from_protocols(&[TransportProtocol::Tcp]),
            ProtocolMask::TCP
        );
        assert_eq!(
            ProtocolMask::from_protocols(&[TransportProtocol::Tcp, TransportProtocol::Udp]),
            ProtocolMask::ALL
        );
    }

    #[test]
    fn test_mask_iter_order() {
        let protocols: Vec<_> = ProtocolMask::ALL.iter().collect();
        assert_eq!(protocols, vec![TransportProtocol::Udp, TransportProtocol::Tcp]);
        assert_eq!(ProtocolMask::TCP.iter().count(), 1);
        assert_eq!(ProtocolMask::ALL.to_string(), "UDP,TCP");
        assert_eq!(ProtocolMask::NONE.to_string(), "none");
    }

    #[test]
    fn test_validate_rejects_empty_mask() {
        let config = CaptureConfig::new().with_protocols(ProtocolMask::NONE);
        assert_eq!(config.validate(), Err(ConfigError::NoProtocols));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("53"), Ok(53));
        assert_eq!(parse_port("65535"), Ok(65535));
        assert_eq!(
            parse_port("65536"),
            Err(ConfigError::InvalidPort("65536".to_string()))
        );
        assert_eq!(parse_port("-1"), Err(ConfigError::InvalidPort("-1".to_string())));
        assert_eq!(parse_port("http"), Err(ConfigError::InvalidPort("http".to_string())));
    }
}
