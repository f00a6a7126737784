use bytes::Bytes;
use chrono::DateTime;
use futures::stream::{self, LocalBoxStream, StreamExt};
use pcap::{Capture, Device, Linktype, Packet, PacketCodec};
use tracing::info;

use crate::dissect::dissect;
use crate::error::Error;
use crate::frame::CapturedFrame;

/// Bytes kept per frame, enough for a full Ethernet frame with a VLAN tag.
pub const SNAPLEN: i32 = 1600;

/// Ordered, lazy sequence of frames. Dropping it releases the capture handle.
pub type FrameStream = LocalBoxStream<'static, Result<CapturedFrame, pcap::Error>>;

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub snaplen: i32,
    pub promisc: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            snaplen: SNAPLEN,
            promisc: true,
        }
    }
}

/// Copies each captured packet into an owned, dissected frame.
pub struct FrameCodec {
    link_type: Linktype,
}

impl FrameCodec {
    pub fn new(link_type: Linktype) -> Self {
        Self { link_type }
    }
}

impl PacketCodec for FrameCodec {
    type Item = CapturedFrame;

    fn decode(&mut self, packet: Packet<'_>) -> Self::Item {
        let header = packet.header;
        let timestamp =
            DateTime::from_timestamp(header.ts.tv_sec as i64, header.ts.tv_usec as u32 * 1000)
                .unwrap_or_default();
        let data = Bytes::copy_from_slice(packet.data);
        let layers = dissect(self.link_type.0, &data);
        CapturedFrame {
            timestamp,
            caplen: header.caplen,
            len: header.len,
            data,
            layers,
        }
    }
}

/// Opens a live capture on `device`.
///
/// The handle waits for packets without a timeout, readiness is driven by
/// the tokio reactor, so this must be called from within a runtime.
pub fn open_live(device: &str, options: &CaptureOptions) -> Result<FrameStream, Error> {
    let capture = Capture::from_device(device)
        .and_then(|c| {
            c.snaplen(options.snaplen)
                .promisc(options.promisc)
                .timeout(0)
                .open()
        })
        .and_then(|c| c.setnonblock())
        .map_err(|e| Error::capture_open(device, e))?;

    let link_type = capture.get_datalink();
    info!(
        "capture opened on {}: link type {:?}, snaplen {}, promisc {}",
        device, link_type, options.snaplen, options.promisc
    );

    let frames = capture
        .stream(FrameCodec::new(link_type))
        .map_err(|e| Error::capture_open(device, e))?;
    Ok(frames.boxed_local())
}

/// Replays a pcap or pcapng file as a frame stream.
pub fn open_offline(path: &str) -> Result<FrameStream, Error> {
    let mut capture = Capture::from_file(path).map_err(|e| Error::capture_open(path, e))?;
    let mut codec = FrameCodec::new(capture.get_datalink());
    info!("capture file opened: {}", path);

    let frames = std::iter::from_fn(move || match capture.next_packet() {
        Ok(packet) => Some(Ok(codec.decode(packet))),
        Err(pcap::Error::NoMorePackets) => None,
        Err(err) => Some(Err(err)),
    });
    Ok(stream::iter(frames).boxed_local())
}

/// Capture devices known to libpcap.
pub fn devices() -> Result<Vec<Device>, pcap::Error> {
    Device::list()
}
