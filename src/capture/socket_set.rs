//! Ownership of the raw sockets, one per enabled protocol.

use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::debug;

use super::SocketId;
use crate::config::ProtocolMask;
use crate::domain::TransportProtocol;
use crate::error::CaptureError;

/// A socket bound to exactly one transport protocol.
#[derive(Debug)]
pub struct SocketHandle {
    id: SocketId,
    protocol: TransportProtocol,
    socket: Socket,
}

impl SocketHandle {
    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn protocol(&self) -> TransportProtocol {
        self.protocol
    }

    pub fn raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    /// Release the descriptor, reporting the `close(2)` result.
    fn close(self) -> Result<(), CaptureError> {
        let protocol = self.protocol;
        let fd = self.socket.into_raw_fd();
        if unsafe { libc::close(fd) } == -1 {
            return Err(CaptureError::SocketClose {
                protocol,
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

/// Ordered set of live sockets.
///
/// Sockets are only ever removed after creation, never added.
#[derive(Debug, Default)]
pub struct SocketSet {
    handles: Vec<SocketHandle>,
}

impl SocketSet {
    /// Open one raw IPv4 socket per protocol in `protocols`.
    ///
    /// Either every socket is opened or none is: on failure the sockets
    /// created so far are closed before the error is returned.
    pub fn open(protocols: ProtocolMask, interface: Option<&str>) -> Result<Self, CaptureError> {
        let mut sockets = Vec::new();
        for protocol in protocols.iter() {
            let socket = open_raw_socket(protocol)?;
            if let Some(device) = interface {
                socket
                    .bind_device(Some(device.as_bytes()))
                    .map_err(|source| CaptureError::BindDevice {
                        protocol,
                        device: device.to_string(),
                        source,
                    })?;
            }
            debug!("Opened raw {} socket (fd {})", protocol, socket.as_raw_fd());
            sockets.push((protocol, socket));
        }
        Ok(Self::from_sockets(sockets))
    }

    /// Build a set from already opened sockets, numbering them in order.
    pub fn from_sockets(sockets: Vec<(TransportProtocol, Socket)>) -> Self {
        let handles = sockets
            .into_iter()
            .enumerate()
            .map(|(index, (protocol, socket))| SocketHandle {
                id: SocketId(index),
                protocol,
                socket,
            })
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocketHandle> {
        self.handles.iter()
    }

    pub fn get(&self, id: SocketId) -> Option<&SocketHandle> {
        self.handles.iter().find(|handle| handle.id == id)
    }

    /// Read one datagram from the socket with this id.
    pub fn recv(&self, id: SocketId, buf: &mut [u8]) -> io::Result<usize> {
        let handle = self.get(id).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no socket {}", id))
        })?;
        (&handle.socket).read(buf)
    }

    /// Detach a socket from the set and close it.
    ///
    /// The socket is gone from the set even if closing it fails.
    pub fn remove_and_close(&mut self, id: SocketId) -> Result<(), CaptureError> {
        let index = self
            .handles
            .iter()
            .position(|handle| handle.id == id)
            .ok_or(CaptureError::UnknownSocket(id.0))?;
        self.handles.remove(index).close()
    }

    /// Close every socket, carrying on past failures.
    pub fn close_all(&mut self) -> Vec<CaptureError> {
        self.handles
            .drain(..)
            .filter_map(|handle| handle.close().err())
            .collect()
    }
}

fn open_raw_socket(protocol: TransportProtocol) -> Result<Socket, CaptureError> {
    let proto = match protocol {
        TransportProtocol::Udp => Protocol::UDP,
        TransportProtocol::Tcp => Protocol::TCP,
    };

    Socket::new(Domain::IPV4, Type::RAW, Some(proto))
        .map_err(|source| create_error(protocol, source))
}

fn create_error(protocol: TransportProtocol, source: io::Error) -> CaptureError {
    match source.raw_os_error() {
        Some(libc::EPERM) | Some(libc::EACCES) => {
            CaptureError::InsufficientPermissions { protocol, source }
        }
        _ => CaptureError::SocketCreate { protocol, source },
    }
}
