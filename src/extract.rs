use crate::demux::{Demuxed, Transport};
use crate::error::Error;

/// Addressing fields pulled from the network and transport layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Pulls addresses and ports out of a demuxed frame.
///
/// IPv4 addresses win over IPv6 ones; without any IP layer both addresses
/// stay empty. Ports that do not parse as `u16` fail the extraction.
pub fn extract(demuxed: &Demuxed<'_>) -> Result<Endpoints, Error> {
    let mut endpoints = Endpoints::default();

    if let Some(ip) = demuxed.ipv4 {
        endpoints.src_ip = ip.source.to_string();
        endpoints.dst_ip = ip.destination.to_string();
    } else if let Some(ip) = demuxed.ipv6 {
        endpoints.src_ip = ip.source.to_string();
        endpoints.dst_ip = ip.destination.to_string();
    }

    let layer = demuxed.transport.name();
    let (src_port, dst_port) = match demuxed.transport {
        Transport::Tcp(tcp) => (tcp.src_port(), tcp.dst_port()),
        Transport::Udp(udp) => (udp.src_port(), udp.dst_port()),
    };
    endpoints.src_port = parse_port(layer, "src_port", src_port)?;
    endpoints.dst_port = parse_port(layer, "dst_port", dst_port)?;

    Ok(endpoints)
}

fn parse_port(layer: &'static str, field: &'static str, value: &str) -> Result<u16, Error> {
    value.parse::<u16>().map_err(|source| Error::Extraction {
        layer,
        field,
        value: value.to_string(),
        source,
    })
}
