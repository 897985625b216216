//! IPv4 / UDP / TCP header decoder.
//!
//! Reads fixed offsets with explicit bounds checks and big-endian
//! conversion. Nothing here reinterprets the buffer as a struct.

use std::net::Ipv4Addr;

use crate::domain::{DecodedPacket, TransportProtocol};
use crate::error::DecodeError;

/// Smallest legal IPv4 header (IHL = 5)
const MIN_IPV4_HEADER_LEN: usize = 20;

/// UDP header is always 8 bytes
const UDP_HEADER_LEN: usize = 8;

/// Source and destination port at the start of the UDP header
const UDP_PORTS_LEN: usize = 4;

/// Smallest legal TCP header (data offset = 5)
const MIN_TCP_HEADER_LEN: usize = 20;

/// IPv4 header field offsets
mod ipv4_fields {
    pub const VERSION_IHL: usize = 0;
    pub const TOTAL_LENGTH: usize = 2;
    pub const PROTOCOL: usize = 9;
    pub const SOURCE: usize = 12;
    pub const DESTINATION: usize = 16;
}

/// Offset of the TCP data-offset nibble
const TCP_DATA_OFFSET: usize = 12;

/// Decoder for raw IPv4 datagrams carrying UDP or TCP.
pub struct Ipv4Parser;

impl Ipv4Parser {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self
    }

    /// Decode one datagram as received from a raw IPv4 socket.
    ///
    /// A buffer that ends inside the IP header, the TCP header or the UDP
    /// ports fails with `TruncatedHeader`. A UDP datagram cut off after its
    /// ports decodes with an empty payload. Otherwise the payload is
    /// whatever follows the transport header and may be empty.
    pub fn parse(&self, data: &[u8]) -> Result<DecodedPacket, DecodeError> {
        let first = *data
            .get(ipv4_fields::VERSION_IHL)
            .ok_or(DecodeError::TruncatedHeader {
                expected: 1,
                actual: 0,
            })?;

        let ip_header_len = usize::from(first & 0x0F) * 4;
        if data.len() < ip_header_len {
            return Err(DecodeError::TruncatedHeader {
                expected: ip_header_len,
                actual: data.len(),
            });
        }
        if ip_header_len < MIN_IPV4_HEADER_LEN {
            return Err(DecodeError::InvalidHeaderLength {
                layer: "IPv4",
                len: ip_header_len,
            });
        }

        let total_len = read_u16(data, ipv4_fields::TOTAL_LENGTH)?;
        let raw_protocol = data[ipv4_fields::PROTOCOL];
        let src_addr = read_ipv4(data, ipv4_fields::SOURCE)?;
        let dst_addr = read_ipv4(data, ipv4_fields::DESTINATION)?;

        let protocol = TransportProtocol::from_ip_protocol(raw_protocol)
            .ok_or(DecodeError::UnsupportedProtocol(raw_protocol))?;

        // UDP only needs its ports; a cut-off length/checksum leaves the
        // payload empty. TCP must hold its whole header.
        let (required, transport_len) = match protocol {
            TransportProtocol::Udp => (ip_header_len + UDP_PORTS_LEN, UDP_HEADER_LEN),
            TransportProtocol::Tcp => {
                let len = Self::tcp_header_len(data, ip_header_len)?;
                (ip_header_len + len, len)
            }
        };
        if data.len() < required {
            return Err(DecodeError::TruncatedHeader {
                expected: required,
                actual: data.len(),
            });
        }

        // Ports sit at the same offsets in UDP and TCP
        let src_port = read_u16(data, ip_header_len)?;
        let dst_port = read_u16(data, ip_header_len + 2)?;

        let payload_start = ip_header_len + transport_len;
        let payload_offset = payload_start.min(data.len());

        Ok(DecodedPacket {
            protocol,
            src_addr,
            dst_addr,
            src_port,
            dst_port,
            total_len,
            captured_len: data.len(),
            payload_offset,
            payload_len: data.len().saturating_sub(payload_start),
        })
    }

    /// Length of the TCP header from its data-offset nibble.
    fn tcp_header_len(data: &[u8], ip_header_len: usize) -> Result<usize, DecodeError> {
        let offset_byte = ip_header_len + TCP_DATA_OFFSET;
        let byte = *data.get(offset_byte).ok_or(DecodeError::TruncatedHeader {
            expected: ip_header_len + MIN_TCP_HEADER_LEN,
            actual: data.len(),
        })?;

        let len = usize::from(byte >> 4) * 4;
        if len < MIN_TCP_HEADER_LEN {
            return Err(DecodeError::InvalidHeaderLength { layer: "TCP", len });
        }
        Ok(len)
    }
}

impl Default for Ipv4Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, DecodeError> {
    match data.get(offset..offset + 2) {
        Some(bytes) => Ok(u16::from_be_bytes([bytes[0], bytes[1]])),
        None => Err(DecodeError::TruncatedHeader {
            expected: offset + 2,
            actual: data.len(),
        }),
    }
}

fn read_ipv4(data: &[u8], offset: usize) -> Result<Ipv4Addr, DecodeError> {
    match data.get(offset..offset + 4) {
        Some(bytes) => Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3])),
        None => Err(DecodeError::TruncatedHeader {
            expected: offset + 4,
            actual: data.len(),
        }),
    }
}
