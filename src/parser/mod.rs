//! IPv4 header decoding.
//!
//! This module turns raw received bytes into `DecodedPacket` views.
//! It performs no I/O and keeps no state between packets.

mod ip_parser;

#[cfg(test)]
pub(crate) mod fixtures;

pub use ip_parser::Ipv4Parser;
