//! Per-protocol packet counters.

use super::TransportProtocol;

/// Number of accepted packets per transport protocol.
///
/// Counters only ever grow. They are bumped by the capture loop after a
/// packet passes the filter and read once for the final summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketCounts {
    pub udp: u64,
    pub tcp: u64,
}

impl PacketCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one accepted packet of the given protocol.
    pub fn record(&mut self, protocol: TransportProtocol) {
        match protocol {
            TransportProtocol::Udp => self.udp += 1,
            TransportProtocol::Tcp => self.tcp += 1,
        }
    }

    pub fn get(&self, protocol: TransportProtocol) -> u64 {
        match protocol {
            TransportProtocol::Udp => self.udp,
            TransportProtocol::Tcp => self.tcp,
        }
    }

    pub fn total(&self) -> u64 {
        self.udp + self.tcp
    }
}
