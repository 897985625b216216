//! rawsniff - raw socket IPv4 sniffer.
//!
//! Opens one raw socket per enabled transport protocol, waits for readiness
//! across all of them, decodes UDP/TCP headers straight from the IP payload,
//! applies the port and payload filters, and counts what passes until it is
//! interrupted.

pub mod capture;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod parser;
pub mod reporter;
pub mod signal;
pub mod sniffer;

pub use capture::{CaptureBackend, RawSocketCapture};
pub use cli::Cli;
pub use config::{CaptureConfig, ProtocolMask};
pub use domain::{DecodedPacket, PacketCounts, TransportProtocol};
pub use error::{CaptureError, ConfigError, DecodeError};
pub use reporter::{ConsoleReporter, PacketReporter};
pub use signal::{ShutdownCheck, ShutdownFlag};
pub use sniffer::Sniffer;
