//! Raw socket capture.
//!
//! This module defines the `CaptureBackend` trait the capture loop drives,
//! and the raw socket implementation built from a `SocketSet` and a
//! `ReadinessPoller`. Tests drive the loop with a scripted backend instead.

mod poller;
mod raw_capture;
mod socket_set;

pub use poller::ReadinessPoller;
pub use raw_capture::RawSocketCapture;
pub use socket_set::{SocketHandle, SocketSet};

use std::fmt;
use std::io;

use crate::domain::TransportProtocol;
use crate::error::CaptureError;
use crate::signal::ShutdownCheck;

/// Largest possible IPv4 datagram.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Identifies one socket for the lifetime of its set. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(pub usize);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one readiness wait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadySet {
    /// Sockets with a datagram waiting
    pub readable: Vec<SocketId>,
    /// Sockets in an error or hang-up state; never also listed as readable
    pub errored: Vec<SocketId>,
}

impl ReadySet {
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty() && self.errored.is_empty()
    }
}

/// What the capture loop needs from the socket layer.
pub trait CaptureBackend {
    /// Block until a socket is readable or failing, or shutdown is requested.
    ///
    /// Fails with `EmptySocketSet` instead of blocking when no socket is left.
    fn wait(&mut self, shutdown: &dyn ShutdownCheck) -> Result<ReadySet, CaptureError>;

    /// Read one datagram from a socket into `buf`.
    fn recv(&mut self, id: SocketId, buf: &mut [u8]) -> io::Result<usize>;

    /// Protocol a live socket listens for.
    fn protocol(&self, id: SocketId) -> Option<TransportProtocol>;

    /// Drop a failing socket from the set and close it.
    fn evict(&mut self, id: SocketId) -> Result<(), CaptureError>;

    /// Close every remaining socket, returning the failures.
    fn close_all(&mut self) -> Vec<CaptureError>;

    /// Number of live sockets.
    fn socket_count(&self) -> usize;
}
