use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// One frame pulled off a capture source.
///
/// The pipeline works on `layers` only. The capture metadata and raw bytes
/// are kept for logging and for consumers that want the whole frame.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub timestamp: DateTime<Utc>,
    /// Bytes actually captured, at most the snapshot length
    pub caplen: u32,
    /// Length of the frame on the wire
    pub len: u32,
    pub data: Bytes,
    /// Layers recognised in `data`, outermost first
    pub layers: Vec<Layer>,
}

impl CapturedFrame {
    pub fn new(timestamp: DateTime<Utc>, data: Bytes, layers: Vec<Layer>) -> Self {
        let len = data.len() as u32;
        Self {
            timestamp,
            caplen: len,
            len,
            data,
            layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Ipv4(Ipv4Layer),
    Ipv6(Ipv6Layer),
    Tcp(TcpLayer),
    Udp(UdpLayer),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Layer {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Layer {
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
}

/// TCP segment view. Ports are kept in the textual form the dissector
/// reported them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpLayer {
    pub source_port: String,
    pub destination_port: String,
    pub payload: Bytes,
}

impl TcpLayer {
    pub fn new(source_port: u16, destination_port: u16, payload: Bytes) -> Self {
        Self {
            source_port: source_port.to_string(),
            destination_port: destination_port.to_string(),
            payload,
        }
    }

    pub fn src_port(&self) -> &str {
        &self.source_port
    }

    pub fn dst_port(&self) -> &str {
        &self.destination_port
    }
}

/// UDP datagram view. Ports are kept in the textual form the dissector
/// reported them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpLayer {
    pub source_port: String,
    pub destination_port: String,
    pub payload: Bytes,
}

impl UdpLayer {
    pub fn new(source_port: u16, destination_port: u16, payload: Bytes) -> Self {
        Self {
            source_port: source_port.to_string(),
            destination_port: destination_port.to_string(),
            payload,
        }
    }

    pub fn src_port(&self) -> &str {
        &self.source_port
    }

    pub fn dst_port(&self) -> &str {
        &self.destination_port
    }
}
