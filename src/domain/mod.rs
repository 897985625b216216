//! Domain models for raw IPv4 capture.
//!
//! These types describe what was captured and counted, independent
//! of the sockets and the wire format.

mod counts;
mod packet;

pub use counts::PacketCounts;
pub use packet::{DecodedPacket, TransportProtocol};
