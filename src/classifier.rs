use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use webrtc::rtp::header::Header;
use webrtc::rtp::packet::Packet;
use webrtc::util::Unmarshal;

/// RTP version defined by RFC 3550.
pub const RTP_VERSION: u8 = 2;

/// Dynamic payload types emitted by the camera and video encoders in the
/// field. Wider dynamic ranges let too much non-RTP UDP noise through.
pub const DYNAMIC_PAYLOAD_TYPES: RangeInclusive<u8> = 96..=100;

/// Acceptance predicate for decoded RTP headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpFilter {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(default = "default_payload_types")]
    pub payload_types: RangeInclusive<u8>,
}

impl Default for RtpFilter {
    fn default() -> Self {
        Self {
            version: default_version(),
            payload_types: default_payload_types(),
        }
    }
}

fn default_version() -> u8 {
    RTP_VERSION
}

fn default_payload_types() -> RangeInclusive<u8> {
    DYNAMIC_PAYLOAD_TYPES
}

/// Why a transport payload was not taken as RTP. Expected noise, never
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeReject {
    #[error("not an rtp packet: {0}")]
    Malformed(String),
    #[error("unexpected rtp version {0}")]
    Version(u8),
    #[error("payload type {0} not accepted")]
    PayloadType(u8),
}

impl RtpFilter {
    pub fn new(version: u8, payload_types: RangeInclusive<u8>) -> Self {
        Self {
            version,
            payload_types,
        }
    }

    /// Decodes `payload` as an RTP packet and applies the predicate.
    pub fn classify(&self, payload: &[u8]) -> Result<Header, DecodeReject> {
        check_extension(payload)?;
        let mut buf = payload;
        let packet =
            Packet::unmarshal(&mut buf).map_err(|err| DecodeReject::Malformed(err.to_string()))?;
        self.check(&packet.header)?;
        Ok(packet.header)
    }

    pub fn check(&self, header: &Header) -> Result<(), DecodeReject> {
        if header.version != self.version {
            return Err(DecodeReject::Version(header.version));
        }
        if !self.payload_types.contains(&header.payload_type) {
            return Err(DecodeReject::PayloadType(header.payload_type));
        }
        Ok(())
    }

    pub fn accepts(&self, header: &Header) -> bool {
        self.check(header).is_ok()
    }
}

const FIXED_HEADER_LEN: usize = 12;
const CSRC_LEN: usize = 4;
const EXTENSION_FLAG: u8 = 0x10;
const CSRC_COUNT_MASK: u8 = 0x0F;
const EXTENSION_PROFILE_ONE_BYTE: u16 = 0xBEDE;
const EXTENSION_PROFILE_TWO_BYTE: u16 = 0x1000;
const EXTENSION_ID_RESERVED: u8 = 0x0F;

/// Walks the RFC 8285 header extension elements the way the decoder does
/// and rejects any element that ends past the packet. The decoder trusts
/// element lengths from the wire and panics on such packets.
///
/// Truncated fixed headers, CSRC lists and extension blocks are left to
/// the decoder, which rejects them on its own.
fn check_extension(payload: &[u8]) -> Result<(), DecodeReject> {
    match payload.first() {
        Some(b0) if payload.len() >= FIXED_HEADER_LEN && b0 & EXTENSION_FLAG != 0 => {}
        _ => return Ok(()),
    }
    let start = FIXED_HEADER_LEN + usize::from(payload[0] & CSRC_COUNT_MASK) * CSRC_LEN;
    let Some(ext) = payload.get(start..start + 4) else {
        return Ok(());
    };
    let profile = u16::from_be_bytes([ext[0], ext[1]]);
    let mut pos = start + 4;
    let end = pos + usize::from(u16::from_be_bytes([ext[2], ext[3]])) * 4;
    if end > payload.len() {
        return Ok(());
    }

    let overrun = |id: u8| {
        DecodeReject::Malformed(format!(
            "header extension {} overruns {} byte packet",
            id,
            payload.len()
        ))
    };
    match profile {
        EXTENSION_PROFILE_ONE_BYTE => {
            while pos < end {
                let b = payload[pos];
                pos += 1;
                if b == 0 {
                    continue;
                }
                let id = b >> 4;
                if id == EXTENSION_ID_RESERVED {
                    break;
                }
                pos += usize::from(b & 0x0F) + 1;
                if pos > payload.len() {
                    return Err(overrun(id));
                }
            }
        }
        EXTENSION_PROFILE_TWO_BYTE => {
            while pos < end {
                let id = payload[pos];
                pos += 1;
                if id == 0 {
                    continue;
                }
                let Some(len) = payload.get(pos) else {
                    return Err(overrun(id));
                };
                pos += 1 + usize::from(*len);
                if pos > payload.len() {
                    return Err(overrun(id));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
