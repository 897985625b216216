//! Reporting of accepted packets and the final summary.
//!
//! This module defines the `PacketReporter` trait and the console
//! implementation that prints to stdout.

mod console_reporter;

pub use console_reporter::{format_packet, format_summary, ConsoleReporter};

use crate::config::ProtocolMask;
use crate::domain::{DecodedPacket, PacketCounts};

/// Receives every accepted packet and the counts at clean shutdown.
pub trait PacketReporter {
    /// Report one packet that passed the filter.
    fn report(&self, packet: &DecodedPacket);

    /// Report the final counts for the enabled protocols.
    fn summary(&self, counts: &PacketCounts, protocols: ProtocolMask);
}
