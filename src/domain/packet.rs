//! Decoded IPv4 packet view.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ConfigError;

/// Transport protocols the sniffer can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Udp,
    Tcp,
}

impl TransportProtocol {
    /// All supported protocols, in socket creation order.
    pub const ALL: [TransportProtocol; 2] = [TransportProtocol::Udp, TransportProtocol::Tcp];

    /// Map an IPv4 protocol number to a supported transport.
    pub fn from_ip_protocol(value: u8) -> Option<Self> {
        match value {
            17 => Some(Self::Udp),
            6 => Some(Self::Tcp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Udp => "UDP",
            Self::Tcp => "TCP",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportProtocol {
    type Err = ConfigError;

    /// Case-insensitive lookup against the protocol names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|protocol| protocol.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnsupportedProtocol(s.to_string()))
    }
}

/// A transport segment located inside a received IPv4 datagram.
///
/// Holds only offsets into the receive buffer, never a copy of the payload.
/// `payload_offset + payload_len` never exceeds `captured_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket {
    pub protocol: TransportProtocol,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    /// Value of the IPv4 total-length field.
    pub total_len: u16,
    /// Number of bytes actually received.
    pub captured_len: usize,
    pub payload_offset: usize,
    pub payload_len: usize,
}

impl DecodedPacket {
    /// Slice the payload out of the buffer this packet was decoded from.
    ///
    /// Returns an empty slice if `data` is not that buffer and is too short.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        data.get(self.payload_offset..self.payload_offset + self.payload_len)
            .unwrap_or(&[])
    }
}
