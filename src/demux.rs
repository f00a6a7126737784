use bytes::Bytes;

use crate::frame::{CapturedFrame, Ipv4Layer, Ipv6Layer, Layer, TcpLayer, UdpLayer};

/// Transport layer selected for a frame
#[derive(Debug, Clone, Copy)]
pub enum Transport<'a> {
    Tcp(&'a TcpLayer),
    Udp(&'a UdpLayer),
}

impl<'a> Transport<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Tcp(_) => "tcp",
            Transport::Udp(_) => "udp",
        }
    }

    pub fn payload(&self) -> &'a Bytes {
        match self {
            Transport::Tcp(tcp) => &tcp.payload,
            Transport::Udp(udp) => &udp.payload,
        }
    }
}

/// Layers of one frame the rest of the pipeline works on.
#[derive(Debug, Clone, Copy)]
pub struct Demuxed<'a> {
    pub transport: Transport<'a>,
    pub ipv4: Option<&'a Ipv4Layer>,
    pub ipv6: Option<&'a Ipv6Layer>,
}

/// Resolves the transport and network layers of a frame.
///
/// The first layer of each kind wins. A frame carrying both TCP and UDP is
/// treated as TCP. Frames without either yield `None`.
pub fn demux(frame: &CapturedFrame) -> Option<Demuxed<'_>> {
    let mut tcp = None;
    let mut udp = None;
    let mut ipv4 = None;
    let mut ipv6 = None;

    for layer in &frame.layers {
        match layer {
            Layer::Tcp(l) => {
                tcp.get_or_insert(l);
            }
            Layer::Udp(l) => {
                udp.get_or_insert(l);
            }
            Layer::Ipv4(l) => {
                ipv4.get_or_insert(l);
            }
            Layer::Ipv6(l) => {
                ipv6.get_or_insert(l);
            }
        }
    }

    let transport = match (tcp, udp) {
        (Some(tcp), _) => Transport::Tcp(tcp),
        (None, Some(udp)) => Transport::Udp(udp),
        (None, None) => return None,
    };

    Some(Demuxed {
        transport,
        ipv4,
        ipv6,
    })
}
