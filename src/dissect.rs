//! Frame dissector.
//!
//! Walks the raw bytes of a frame header by header and records every IP,
//! TCP and UDP layer it meets, outermost first. IP-in-IP and VXLAN tunnels
//! are followed, so a single frame may carry more than one layer of a kind.
//! Anything that does not parse simply ends the walk.

use std::ops::Range;

use bytes::Bytes;
use etherparse::{
    Ethernet2HeaderSlice, Ipv4HeaderSlice, Ipv6HeaderSlice, TcpHeaderSlice, UdpHeaderSlice,
};
use tracing::trace;

use crate::frame::{Ipv4Layer, Ipv6Layer, Layer, TcpLayer, UdpLayer};

/// Link-layer header types as returned by `pcap_datalink`.
pub mod linktype {
    pub const NULL: i32 = 0;
    pub const ETHERNET: i32 = 1;
    pub const RAW: i32 = 12;
    pub const RAW_OPENBSD: i32 = 14;
    pub const RAW_LINKTYPE: i32 = 101;
    pub const LOOP: i32 = 108;
    pub const LINUX_SLL: i32 = 113;
    pub const IPV4: i32 = 228;
    pub const IPV6: i32 = 229;
}

mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const IPV6: u16 = 0x86DD;
    pub const VLAN: u16 = 0x8100;
    pub const QINQ: u16 = 0x88A8;
}

mod ip_number {
    pub const HOP_BY_HOP: u8 = 0;
    pub const IPIP: u8 = 4;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6_IN_IP: u8 = 41;
    pub const ROUTING: u8 = 43;
    pub const FRAGMENT: u8 = 44;
    pub const AH: u8 = 51;
    pub const DESTINATION: u8 = 60;
}

pub const VXLAN_PORT: u16 = 4789;

const VXLAN_HEADER_LEN: usize = 8;
const VXLAN_FLAG_VNI: u8 = 0x08;
const VLAN_TAG_LEN: usize = 4;
const LINUX_SLL_HEADER_LEN: usize = 16;
const NULL_HEADER_LEN: usize = 4;

/// Upper bound on the headers walked in one frame, tunnels included.
const MAX_DEPTH: usize = 16;

enum Next {
    Ethernet(Range<usize>),
    EtherType(u16, Range<usize>),
    Ip(u8, Range<usize>),
    Done,
}

pub fn dissect(link_type: i32, data: &Bytes) -> Vec<Layer> {
    let mut layers = Vec::new();
    let all = 0..data.len();

    let mut next = match link_type {
        linktype::ETHERNET => Next::Ethernet(all),
        linktype::NULL | linktype::LOOP if data.len() >= NULL_HEADER_LEN => {
            raw_ip(data, NULL_HEADER_LEN..data.len())
        }
        linktype::LINUX_SLL if data.len() >= LINUX_SLL_HEADER_LEN => Next::EtherType(
            u16::from_be_bytes([data[14], data[15]]),
            LINUX_SLL_HEADER_LEN..data.len(),
        ),
        linktype::RAW | linktype::RAW_OPENBSD | linktype::RAW_LINKTYPE => raw_ip(data, all),
        linktype::IPV4 => Next::EtherType(ethertype::IPV4, all),
        linktype::IPV6 => Next::EtherType(ethertype::IPV6, all),
        other => {
            trace!("unsupported link type {}", other);
            Next::Done
        }
    };

    for _ in 0..MAX_DEPTH {
        next = match next {
            Next::Ethernet(range) => ethernet(data, range),
            Next::EtherType(ty, range) => ether_type(data, ty, range, &mut layers),
            Next::Ip(proto, range) => ip_payload(data, proto, range, &mut layers),
            Next::Done => break,
        };
    }
    layers
}

/// Picks the IP version from the first nibble, for link types without an
/// ethertype.
fn raw_ip(data: &[u8], range: Range<usize>) -> Next {
    match data.get(range.start).map(|b| b >> 4) {
        Some(4) => Next::EtherType(ethertype::IPV4, range),
        Some(6) => Next::EtherType(ethertype::IPV6, range),
        _ => Next::Done,
    }
}

fn ethernet(data: &[u8], range: Range<usize>) -> Next {
    match Ethernet2HeaderSlice::from_slice(&data[range.clone()]) {
        Ok(eth) => Next::EtherType(
            eth.ether_type().0,
            range.start + eth.slice().len()..range.end,
        ),
        Err(err) => {
            trace!("ethernet parse error: {}", err);
            Next::Done
        }
    }
}

fn ether_type(data: &Bytes, ty: u16, range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    match ty {
        ethertype::IPV4 => ipv4(data, range, layers),
        ethertype::IPV6 => ipv6(data, range, layers),
        ethertype::VLAN | ethertype::QINQ => {
            let tag = &data[range.clone()];
            if tag.len() < VLAN_TAG_LEN {
                return Next::Done;
            }
            Next::EtherType(
                u16::from_be_bytes([tag[2], tag[3]]),
                range.start + VLAN_TAG_LEN..range.end,
            )
        }
        _ => Next::Done,
    }
}

fn ipv4(data: &[u8], range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    let ip = match Ipv4HeaderSlice::from_slice(&data[range.clone()]) {
        Ok(ip) => ip,
        Err(err) => {
            trace!("ipv4 parse error: {}", err);
            return Next::Done;
        }
    };
    layers.push(Layer::Ipv4(Ipv4Layer {
        source: ip.source_addr(),
        destination: ip.destination_addr(),
    }));

    // total length 0 shows up on captures with segmentation offload
    let start = range.start + ip.slice().len();
    let end = match ip.total_len() {
        0 => range.end,
        n => (range.start + usize::from(n)).clamp(start, range.end),
    };

    // only the first fragment carries the transport header
    if ip.fragments_offset().value() != 0 {
        return Next::Done;
    }
    Next::Ip(ip.protocol().0, start..end)
}

fn ipv6(data: &[u8], range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    let ip = match Ipv6HeaderSlice::from_slice(&data[range.clone()]) {
        Ok(ip) => ip,
        Err(err) => {
            trace!("ipv6 parse error: {}", err);
            return Next::Done;
        }
    };
    layers.push(Layer::Ipv6(Ipv6Layer {
        source: ip.source_addr(),
        destination: ip.destination_addr(),
    }));

    let start = range.start + ip.slice().len();
    let end = match ip.payload_length() {
        0 => range.end,
        n => (start + usize::from(n)).min(range.end),
    };
    ipv6_extensions(data, ip.next_header().0, start..end)
}

fn ipv6_extensions(data: &[u8], mut next: u8, mut range: Range<usize>) -> Next {
    for _ in 0..MAX_DEPTH {
        let header = &data[range.clone()];
        let len = match next {
            ip_number::HOP_BY_HOP | ip_number::ROUTING | ip_number::DESTINATION => {
                header.get(1).map(|l| (usize::from(*l) + 1) * 8)
            }
            ip_number::FRAGMENT => {
                if header.len() < 8 {
                    return Next::Done;
                }
                if u16::from_be_bytes([header[2], header[3]]) >> 3 != 0 {
                    return Next::Done;
                }
                Some(8)
            }
            ip_number::AH => header.get(1).map(|l| (usize::from(*l) + 2) * 4),
            _ => return Next::Ip(next, range),
        };
        match len {
            Some(len) if len <= header.len() => {
                next = header[0];
                range.start += len;
            }
            _ => return Next::Done,
        }
    }
    Next::Done
}

fn ip_payload(data: &Bytes, proto: u8, range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    match proto {
        ip_number::TCP => tcp(data, range, layers),
        ip_number::UDP => udp(data, range, layers),
        ip_number::IPIP => Next::EtherType(ethertype::IPV4, range),
        ip_number::IPV6_IN_IP => Next::EtherType(ethertype::IPV6, range),
        _ => Next::Done,
    }
}

fn tcp(data: &Bytes, range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    match TcpHeaderSlice::from_slice(&data[range.clone()]) {
        Ok(tcp) => {
            let start = range.start + tcp.slice().len();
            layers.push(Layer::Tcp(TcpLayer::new(
                tcp.source_port(),
                tcp.destination_port(),
                data.slice(start..range.end),
            )));
        }
        Err(err) => trace!("tcp parse error: {}", err),
    }
    Next::Done
}

fn udp(data: &Bytes, range: Range<usize>, layers: &mut Vec<Layer>) -> Next {
    let udp = match UdpHeaderSlice::from_slice(&data[range.clone()]) {
        Ok(udp) => udp,
        Err(err) => {
            trace!("udp parse error: {}", err);
            return Next::Done;
        }
    };
    let start = range.start + udp.slice().len();
    let end = match udp.length() {
        0 => range.end,
        n => (range.start + usize::from(n)).clamp(start, range.end),
    };
    let destination = udp.destination_port();
    layers.push(Layer::Udp(UdpLayer::new(
        udp.source_port(),
        destination,
        data.slice(start..end),
    )));

    if destination == VXLAN_PORT {
        vxlan(data, start..end)
    } else {
        Next::Done
    }
}

fn vxlan(data: &[u8], range: Range<usize>) -> Next {
    let header = &data[range.clone()];
    if header.len() < VXLAN_HEADER_LEN || header[0] & VXLAN_FLAG_VNI == 0 {
        return Next::Done;
    }
    Next::Ethernet(range.start + VXLAN_HEADER_LEN..range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::PacketBuilder;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const SRC_MAC: [u8; 6] = [0x02, 0, 0, 0, 0, 0x01];
    const DST_MAC: [u8; 6] = [0x02, 0, 0, 0, 0, 0x02];

    fn ipv4_udp(src: [u8; 4], dst: [u8; 4], sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
        let builder = PacketBuilder::ipv4(src, dst, 64).udp(sport, dport);
        let mut out = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut out, payload).unwrap();
        out
    }

    fn ethernet_header(ty: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&DST_MAC);
        out.extend_from_slice(&SRC_MAC);
        out.extend_from_slice(&ty.to_be_bytes());
        out
    }

    #[test]
    fn test_ethernet_ipv4_udp() {
        let builder = PacketBuilder::ethernet2(SRC_MAC, DST_MAC)
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(5000, 5004);
        let payload = [1u8, 2, 3, 4];
        let mut out = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut out, &payload).unwrap();

        let layers = dissect(linktype::ETHERNET, &Bytes::from(out));
        assert_eq!(
            layers,
            vec![
                Layer::Ipv4(Ipv4Layer {
                    source: Ipv4Addr::new(10, 0, 0, 1),
                    destination: Ipv4Addr::new(10, 0, 0, 2),
                }),
                Layer::Udp(UdpLayer::new(5000, 5004, Bytes::from_static(&[1, 2, 3, 4]))),
            ]
        );
    }

    #[test]
    fn test_ethernet_padding_is_not_payload() {
        let builder = PacketBuilder::ethernet2(SRC_MAC, DST_MAC)
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(5000, 5004);
        let mut out = Vec::with_capacity(builder.size(1));
        builder.write(&mut out, &[0xAB]).unwrap();
        out.extend_from_slice(&[0u8; 16]);

        let layers = dissect(linktype::ETHERNET, &Bytes::from(out));
        match layers.last() {
            Some(Layer::Udp(udp)) => assert_eq!(udp.payload.as_ref(), &[0xAB]),
            other => panic!("expected udp layer, got {:?}", other),
        }
    }

    #[test]
    fn test_ethernet_ipv6_tcp() {
        let src = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let dst = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        let builder = PacketBuilder::ethernet2(SRC_MAC, DST_MAC)
            .ipv6(src.octets(), dst.octets(), 64)
            .tcp(40000, 554, 1, 65535);
        let payload = b"$\x00\x00\x10";
        let mut out = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut out, payload).unwrap();

        let layers = dissect(linktype::ETHERNET, &Bytes::from(out));
        assert_eq!(layers.len(), 2);
        assert_eq!(
            layers[0],
            Layer::Ipv6(Ipv6Layer {
                source: src,
                destination: dst
            })
        );
        match &layers[1] {
            Layer::Tcp(tcp) => {
                assert_eq!(tcp.src_port(), "40000");
                assert_eq!(tcp.dst_port(), "554");
                assert_eq!(tcp.payload.as_ref(), payload);
            }
            other => panic!("expected tcp layer, got {:?}", other),
        }
    }

    #[test]
    fn test_vlan_tagged_frame() {
        let mut out = ethernet_header(ethertype::VLAN);
        out.extend_from_slice(&[0x00, 0x0A]);
        out.extend_from_slice(&ethertype::IPV4.to_be_bytes());
        out.extend(ipv4_udp([192, 168, 1, 10], [192, 168, 1, 20], 6000, 6002, &[9]));

        let layers = dissect(linktype::ETHERNET, &Bytes::from(out));
        assert_eq!(layers.len(), 2);
        assert!(matches!(&layers[1], Layer::Udp(udp) if udp.dst_port() == "6002"));
    }

    #[test]
    fn test_linux_sll_and_raw_links() {
        let packet = ipv4_udp([10, 1, 1, 1], [10, 1, 1, 2], 7000, 7002, &[1, 2]);

        let mut sll = vec![0u8; LINUX_SLL_HEADER_LEN];
        sll[14..16].copy_from_slice(&ethertype::IPV4.to_be_bytes());
        sll.extend_from_slice(&packet);
        assert_eq!(dissect(linktype::LINUX_SLL, &Bytes::from(sll)).len(), 2);

        for link in [linktype::RAW, linktype::RAW_LINKTYPE, linktype::IPV4] {
            assert_eq!(dissect(link, &Bytes::from(packet.clone())).len(), 2);
        }

        let mut null = vec![2u8, 0, 0, 0];
        null.extend_from_slice(&packet);
        assert_eq!(dissect(linktype::NULL, &Bytes::from(null)).len(), 2);
    }

    #[test]
    fn test_ip_in_ip_tunnel() {
        let inner = ipv4_udp([10, 0, 0, 1], [10, 0, 0, 2], 5000, 5004, &[7, 7]);
        let total = (20 + inner.len()) as u16;
        let mut out = vec![0x45, 0x00];
        out.extend_from_slice(&total.to_be_bytes());
        out.extend_from_slice(&[0, 0, 0, 0, 64, ip_number::IPIP, 0, 0]);
        out.extend_from_slice(&[172, 16, 0, 1, 172, 16, 0, 2]);
        out.extend_from_slice(&inner);

        let layers = dissect(linktype::RAW, &Bytes::from(out));
        assert_eq!(layers.len(), 3);
        assert!(matches!(&layers[0], Layer::Ipv4(ip) if ip.source == Ipv4Addr::new(172, 16, 0, 1)));
        assert!(matches!(&layers[1], Layer::Ipv4(ip) if ip.source == Ipv4Addr::new(10, 0, 0, 1)));
        assert!(matches!(&layers[2], Layer::Udp(_)));
    }

    #[test]
    fn test_vxlan_tunnel_exposes_inner_tcp() {
        let inner = PacketBuilder::ethernet2(SRC_MAC, DST_MAC)
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .tcp(8000, 8002, 1, 1024);
        let mut inner_frame = Vec::with_capacity(inner.size(3));
        inner.write(&mut inner_frame, &[1, 2, 3]).unwrap();

        let mut vxlan = vec![VXLAN_FLAG_VNI, 0, 0, 0, 0, 0, 0x2A, 0];
        vxlan.extend_from_slice(&inner_frame);

        let outer = PacketBuilder::ethernet2(SRC_MAC, DST_MAC)
            .ipv4([192, 168, 0, 1], [192, 168, 0, 2], 64)
            .udp(49152, VXLAN_PORT);
        let mut out = Vec::with_capacity(outer.size(vxlan.len()));
        outer.write(&mut out, &vxlan).unwrap();

        let layers = dissect(linktype::ETHERNET, &Bytes::from(out));
        assert_eq!(layers.len(), 4);
        assert!(matches!(&layers[1], Layer::Udp(udp) if udp.dst_port() == "4789"));
        assert!(matches!(&layers[3], Layer::Tcp(tcp) if tcp.payload.as_ref() == [1, 2, 3]));
    }

    #[test]
    fn test_ipv6_extension_headers_are_skipped() {
        let src = Ipv6Addr::LOCALHOST;
        let udp = {
            let mut udp = Vec::new();
            udp.extend_from_slice(&5000u16.to_be_bytes());
            udp.extend_from_slice(&5004u16.to_be_bytes());
            udp.extend_from_slice(&10u16.to_be_bytes());
            udp.extend_from_slice(&[0, 0, 0xCA, 0xFE]);
            udp
        };
        // hop-by-hop header, 8 bytes, followed by udp
        let mut ext = vec![ip_number::UDP, 0, 1, 4, 0, 0, 0, 0];
        ext.extend_from_slice(&udp);

        let mut out = vec![0x60, 0, 0, 0];
        out.extend_from_slice(&(ext.len() as u16).to_be_bytes());
        out.extend_from_slice(&[ip_number::HOP_BY_HOP, 64]);
        out.extend_from_slice(&src.octets());
        out.extend_from_slice(&src.octets());
        out.extend_from_slice(&ext);

        let layers = dissect(linktype::IPV6, &Bytes::from(out));
        assert_eq!(layers.len(), 2);
        assert!(matches!(&layers[1], Layer::Udp(udp) if udp.payload.as_ref() == [0xCA, 0xFE]));
    }

    #[test]
    fn test_garbage_yields_no_layers() {
        assert!(dissect(linktype::ETHERNET, &Bytes::from_static(&[1, 2, 3])).is_empty());
        assert!(dissect(linktype::RAW, &Bytes::from_static(&[0x10, 0, 0])).is_empty());
        assert!(dissect(linktype::LINUX_SLL, &Bytes::from_static(&[0; 8])).is_empty());
        assert!(dissect(4242, &Bytes::from_static(&[0x45; 40])).is_empty());
    }

    #[test]
    fn test_truncated_transport_keeps_network_layer() {
        let mut packet = ipv4_udp([10, 0, 0, 1], [10, 0, 0, 2], 5000, 5004, &[]);
        packet.truncate(24);
        packet[2..4].copy_from_slice(&24u16.to_be_bytes());
        let layers = dissect(linktype::RAW, &Bytes::from(packet));
        assert_eq!(layers.len(), 1);
        assert!(matches!(&layers[0], Layer::Ipv4(_)));
    }
}
