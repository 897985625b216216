//! The capture loop.
//!
//! Waits for readiness, reads one datagram per ready socket, decodes and
//! filters it, then counts and reports accepted packets until shutdown is
//! requested.

use std::io;

use tracing::{debug, info, trace, warn};

use crate::capture::{CaptureBackend, SocketId, MAX_DATAGRAM_SIZE};
use crate::config::{CaptureConfig, ProtocolMask};
use crate::domain::PacketCounts;
use crate::error::CaptureError;
use crate::filter::PacketFilter;
use crate::parser::Ipv4Parser;
use crate::reporter::PacketReporter;
use crate::signal::ShutdownCheck;

/// Drives a capture backend and accumulates per-protocol counts.
pub struct Sniffer<B, R> {
    backend: B,
    reporter: R,
    parser: Ipv4Parser,
    filter: PacketFilter,
    protocols: ProtocolMask,
    counts: PacketCounts,
    buffer: Vec<u8>,
}

impl<B: CaptureBackend, R: PacketReporter> Sniffer<B, R> {
    pub fn new(backend: B, reporter: R, config: &CaptureConfig) -> Self {
        Self {
            backend,
            reporter,
            parser: Ipv4Parser::new(),
            filter: PacketFilter::from_config(config),
            protocols: config.protocols,
            counts: PacketCounts::new(),
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        }
    }

    /// Run until shutdown is requested or a fatal error occurs.
    ///
    /// Remaining sockets are closed either way. The summary is reported
    /// only on a clean shutdown.
    pub fn run(&mut self, shutdown: &dyn ShutdownCheck) -> Result<PacketCounts, CaptureError> {
        let result = self.capture(shutdown);

        for err in self.backend.close_all() {
            warn!("{}", err);
        }

        result?;
        self.reporter.summary(&self.counts, self.protocols);
        Ok(self.counts)
    }

    pub fn counts(&self) -> PacketCounts {
        self.counts
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn capture(&mut self, shutdown: &dyn ShutdownCheck) -> Result<(), CaptureError> {
        loop {
            let ready = self.backend.wait(shutdown)?;

            if shutdown.should_stop() {
                info!("Shutdown requested, stopping capture");
                return Ok(());
            }

            for id in ready.errored {
                self.evict(id);
            }

            for id in ready.readable {
                self.receive(id)?;
            }
        }
    }

    fn evict(&mut self, id: SocketId) {
        let protocol = self.backend.protocol(id);
        match self.backend.evict(id) {
            Ok(()) => warn!(
                "{} socket {} reported an error, removed ({} left)",
                protocol.map_or("unknown", |p| p.name()),
                id,
                self.backend.socket_count()
            ),
            Err(err) => warn!("Failed to evict socket {}: {}", id, err),
        }
    }

    /// Read, decode, filter and count one datagram from `id`.
    fn receive(&mut self, id: SocketId) -> Result<(), CaptureError> {
        let len = match self.backend.recv(id, &mut self.buffer) {
            Ok(len) => len,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                debug!("Nothing read from socket {}: {}", id, err);
                return Ok(());
            }
            Err(err) => return Err(CaptureError::FatalReceive(err)),
        };

        let data = &self.buffer[..len];
        let packet = match self.parser.parse(data) {
            Ok(packet) => packet,
            Err(err) => {
                debug!("Dropped {} byte datagram: {}", len, err);
                return Ok(());
            }
        };

        if !self.filter.accepts(&packet, data) {
            trace!(
                "Filtered out {} packet to port {} ({} bytes)",
                packet.protocol,
                packet.dst_port,
                packet.captured_len
            );
            return Ok(());
        }

        self.counts.record(packet.protocol);
        self.reporter.report(&packet);
        Ok(())
    }
}
