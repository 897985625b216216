//! Raw IPv4 socket capture backend.

use std::io;

use tracing::info;

use super::{CaptureBackend, ReadinessPoller, ReadySet, SocketId, SocketSet};
use crate::config::CaptureConfig;
use crate::domain::TransportProtocol;
use crate::error::CaptureError;
use crate::signal::ShutdownCheck;

/// Capture from raw sockets, one per enabled protocol.
pub struct RawSocketCapture {
    sockets: SocketSet,
    poller: ReadinessPoller,
}

impl RawSocketCapture {
    /// Open the raw sockets the configuration asks for.
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let sockets = SocketSet::open(config.protocols, config.interface.as_deref())?;

        match &config.interface {
            Some(device) => info!("Listening for {} on {}", config.protocols, device),
            None => info!("Listening for {} on all interfaces", config.protocols),
        }

        Ok(Self::from_socket_set(sockets))
    }

    /// Capture from an existing socket set.
    pub fn from_socket_set(sockets: SocketSet) -> Self {
        Self {
            sockets,
            poller: ReadinessPoller::new(),
        }
    }
}

impl CaptureBackend for RawSocketCapture {
    fn wait(&mut self, shutdown: &dyn ShutdownCheck) -> Result<ReadySet, CaptureError> {
        self.poller.wait(&self.sockets, shutdown)
    }

    fn recv(&mut self, id: SocketId, buf: &mut [u8]) -> io::Result<usize> {
        self.sockets.recv(id, buf)
    }

    fn protocol(&self, id: SocketId) -> Option<TransportProtocol> {
        self.sockets.get(id).map(|handle| handle.protocol())
    }

    fn evict(&mut self, id: SocketId) -> Result<(), CaptureError> {
        self.sockets.remove_and_close(id)
    }

    fn close_all(&mut self) -> Vec<CaptureError> {
        self.sockets.close_all()
    }

    fn socket_count(&self) -> usize {
        self.sockets.len()
    }
}
