//! Packet filtering.
//!
//! Decides which decoded packets are counted and logged, separate
//! from decoding and reporting.

mod packet_filter;

pub use packet_filter::PacketFilter;
