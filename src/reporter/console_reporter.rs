//! Console-based packet reporter.

use std::io::{self, Write};

use crate::config::ProtocolMask;
use crate::domain::{DecodedPacket, PacketCounts};
use crate::reporter::PacketReporter;

/// Prints one line per accepted packet and the summary to stdout.
#[derive(Debug, Default, Clone)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

/// `Received <PROTO> packet <src>:<port> > <dst>:<port> of size <N>`
pub fn format_packet(packet: &DecodedPacket) -> String {
    format!(
        "Received {} packet {}:{} > {}:{} of size {}",
        packet.protocol,
        packet.src_addr,
        packet.src_port,
        packet.dst_addr,
        packet.dst_port,
        packet.total_len
    )
}

/// One `Got <n> <PROTO> packets` line per enabled protocol, then the total.
pub fn format_summary(counts: &PacketCounts, protocols: ProtocolMask) -> Vec<String> {
    let mut lines: Vec<String> = protocols
        .iter()
        .map(|protocol| format!("Got {} {} packets", counts.get(protocol), protocol))
        .collect();
    lines.push(format!("Total: {}", counts.total()));
    lines
}

impl PacketReporter for ConsoleReporter {
    fn report(&self, packet: &DecodedPacket) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", format_packet(packet));
    }

    fn summary(&self, counts: &PacketCounts, protocols: ProtocolMask) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout);
        for line in format_summary(counts, protocols) {
            let _ = writeln!(stdout, "{}", line);
        }
    }
}
