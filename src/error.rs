//! Error types for the sniffer.

use std::io;

use thiserror::Error;

use crate::domain::TransportProtocol;

/// Errors raised while interpreting a received datagram.
///
/// Decode errors are local to one packet: the packet is dropped and
/// the capture loop keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated header: need {expected} bytes, have {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    #[error("unsupported IP protocol {0}")]
    UnsupportedProtocol(u8),

    #[error("invalid {layer} header length {len}")]
    InvalidHeaderLength { layer: &'static str, len: usize },
}

/// Errors raised by the socket set, the readiness poller and the capture loop.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to create {protocol} socket: {source}")]
    SocketCreate {
        protocol: TransportProtocol,
        #[source]
        source: io::Error,
    },

    #[error("Insufficient permissions to open a raw {protocol} socket (run as root or grant CAP_NET_RAW): {source}")]
    InsufficientPermissions {
        protocol: TransportProtocol,
        #[source]
        source: io::Error,
    },

    #[error("Failed to bind {protocol} socket to device '{device}': {source}")]
    BindDevice {
        protocol: TransportProtocol,
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to close {protocol} socket: {source}")]
    SocketClose {
        protocol: TransportProtocol,
        #[source]
        source: io::Error,
    },

    #[error("Too many sockets to poll: {count} exceeds the limit of {limit}")]
    TooManySockets { count: usize, limit: usize },

    #[error("No sockets left to listen on")]
    EmptySocketSet,

    #[error("Failed to wait for socket readiness: {0}")]
    Poll(#[source] io::Error),

    #[error("Failed to receive package: {0}")]
    FatalReceive(#[source] io::Error),

    #[error("Unknown socket id {0}")]
    UnknownSocket(usize),
}

/// Errors raised while turning command-line input into a capture configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Port out of bounds: {0}")]
    InvalidPort(String),

    #[error("Unsupported protocol '{0}'")]
    UnsupportedProtocol(String),

    #[error("No protocol enabled")]
    NoProtocols,
}
