use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use storage::Storage;
use tracing::{debug, error, info, trace};

use crate::capture::{self, CaptureOptions};
use crate::classifier::{DecodeReject, RtpFilter};
use crate::demux::demux;
use crate::error::Error;
use crate::extract::extract;
use crate::frame::CapturedFrame;
use crate::record::assemble;

/// Counters of one capture session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub frames: u64,
    /// Frames without a TCP or UDP layer
    pub ignored: u64,
    /// Transport payloads that were not accepted as RTP
    pub rejected: u64,
    pub stored: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} ignored={} rejected={} stored={}",
            self.frames, self.ignored, self.rejected, self.stored
        )
    }
}

/// What happened to a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stored,
    Ignored,
    Rejected(DecodeReject),
}

/// Capture driver: pulls frames one at a time and persists the RTP ones.
pub struct Sniffer {
    storage: Arc<dyn Storage + Send + Sync>,
    filter: RtpFilter,
}

impl Sniffer {
    pub fn new(storage: Arc<dyn Storage + Send + Sync>, filter: RtpFilter) -> Self {
        Self { storage, filter }
    }

    /// Opens `device` for live capture and runs until the capture ends or a
    /// fault stops it.
    pub async fn start(&self, device: &str) -> Result<Stats, Error> {
        let frames = capture::open_live(device, &CaptureOptions::default())?;
        self.run(frames).await
    }

    /// Replays a capture file through the pipeline.
    pub async fn replay(&self, path: &str) -> Result<Stats, Error> {
        let frames = capture::open_offline(path)?;
        self.run(frames).await
    }

    /// Drives the pipeline over `frames`.
    ///
    /// The stream is owned by the loop and dropped exactly once, when the
    /// loop returns.
    pub async fn run<S>(&self, mut frames: S) -> Result<Stats, Error>
    where
        S: Stream<Item = Result<CapturedFrame, pcap::Error>> + Unpin,
    {
        let mut stats = Stats::default();
        info!("capture running");

        let result = loop {
            let frame = match frames.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(pcap::Error::TimeoutExpired)) => continue,
                Some(Err(pcap::Error::NoMorePackets)) | None => break Ok(stats),
                Some(Err(err)) => break Err(Error::CaptureRead(err)),
            };
            stats.frames += 1;

            match self.process(&frame).await {
                Ok(Outcome::Stored) => stats.stored += 1,
                Ok(Outcome::Ignored) => stats.ignored += 1,
                Ok(Outcome::Rejected(reject)) => {
                    trace!(
                        "frame {} ({}/{} bytes) dropped: {}",
                        stats.frames,
                        frame.caplen,
                        frame.len,
                        reject
                    );
                    stats.rejected += 1;
                }
                Err(err) => break Err(err),
            }
        };
        drop(frames);

        match &result {
            Ok(stats) => info!("capture closed: {}", stats),
            Err(err) => error!("capture faulted: {} ({})", err, stats),
        }
        result
    }

    /// Runs one frame through demux, classification, extraction and storage.
    pub async fn process(&self, frame: &CapturedFrame) -> Result<Outcome, Error> {
        let Some(demuxed) = demux(frame) else {
            return Ok(Outcome::Ignored);
        };

        let header = match self.filter.classify(demuxed.transport.payload()) {
            Ok(header) => header,
            Err(reject) => return Ok(Outcome::Rejected(reject)),
        };

        let endpoints = extract(&demuxed)?;
        let packet = assemble(endpoints, &header);
        debug!(
            "rtp at {} {}:{} -> {}:{} ssrc={:#010x} seq={} ts={}",
            frame.timestamp,
            packet.src_ip,
            packet.src_port,
            packet.dst_ip,
            packet.dst_port,
            packet.ssrc,
            packet.sequence_number,
            packet.timestamp
        );

        self.storage
            .create_rtp_packet(packet)
            .await
            .map_err(Error::persistence)?;
        Ok(Outcome::Stored)
    }
}
