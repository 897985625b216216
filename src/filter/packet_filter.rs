//! Destination port and payload substring filter.

use crate::config::CaptureConfig;
use crate::domain::DecodedPacket;

/// Accepts packets whose destination port and payload match the configuration.
///
/// Both rules must pass. An unset rule always passes.
#[derive(Debug, Clone, Default)]
pub struct PacketFilter {
    port: Option<u16>,
    word: Option<Vec<u8>>,
}

impl PacketFilter {
    /// Create a filter that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter from the capture configuration.
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new()
            .with_port(config.port)
            .with_word(config.word_filter.clone())
    }

    /// Only accept packets sent to this destination port.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Only accept packets whose payload contains these bytes.
    ///
    /// An empty word leaves the payload rule unset.
    pub fn with_word(mut self, word: Option<Vec<u8>>) -> Self {
        self.word = word.filter(|word| !word.is_empty());
        self
    }

    /// Decide whether `packet`, decoded from `data`, should be counted.
    pub fn accepts(&self, packet: &DecodedPacket, data: &[u8]) -> bool {
        self.port_matches(packet.dst_port) && self.payload_matches(packet.payload(data))
    }

    fn port_matches(&self, dst_port: u16) -> bool {
        self.port.map_or(true, |port| port == dst_port)
    }

    fn payload_matches(&self, payload: &[u8]) -> bool {
        match &self.word {
            None => true,
            Some(word) => contains_subslice(payload, word),
        }
    }
}

/// Byte-exact substring search. An empty needle never matches.
fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
