//! Test datagrams built with pnet's packet writers.

use std::net::Ipv4Addr;

use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;

const IPV4_HEADER_LEN: usize = 20;

fn ipv4_datagram(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
    transport: &[u8],
) -> Vec<u8> {
    let mut buf = vec![0u8; IPV4_HEADER_LEN + transport.len()];
    let total_len = buf.len() as u16;
    {
        let mut ip = MutableIpv4Packet::new(&mut buf).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length(total_len);
        ip.set_ttl(64);
        ip.set_next_level_protocol(protocol);
        ip.set_source(src);
        ip.set_destination(dst);
    }
    buf[IPV4_HEADER_LEN..].copy_from_slice(transport);
    buf
}

/// A complete IPv4 + UDP datagram.
pub(crate) fn udp_datagram(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut udp_buf = vec![0u8; 8 + payload.len()];
    let udp_len = udp_buf.len() as u16;
    {
        let mut udp = MutableUdpPacket::new(&mut udp_buf).unwrap();
        udp.set_source(src_port);
        udp.set_destination(dst_port);
        udp.set_length(udp_len);
        udp.set_payload(payload);
    }
    ipv4_datagram(src, dst, IpNextHeaderProtocols::Udp, &udp_buf)
}

/// A complete IPv4 + TCP segment with a 20 byte TCP header.
pub(crate) fn tcp_segment(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    tcp_segment_with_options(src, src_port, dst, dst_port, 5, payload)
}

/// A complete IPv4 + TCP segment whose header is `data_offset` words long.
pub(crate) fn tcp_segment_with_options(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    data_offset: u8,
    payload: &[u8],
) -> Vec<u8> {
    let header_len = usize::from(data_offset) * 4;
    let mut tcp_buf = vec![0u8; header_len + payload.len()];
    {
        let mut tcp = MutableTcpPacket::new(&mut tcp_buf).unwrap();
        tcp.set_source(src_port);
        tcp.set_destination(dst_port);
        tcp.set_sequence(1);
        tcp.set_data_offset(data_offset);
        tcp.set_window(65535);
    }
    tcp_buf[header_len..].copy_from_slice(payload);
    ipv4_datagram(src, dst, IpNextHeaderProtocols::Tcp, &tcp_buf)
}
