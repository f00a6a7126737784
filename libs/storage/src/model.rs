use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One RTP packet as observed on the wire.
///
/// Built once by the capture pipeline and never mutated afterwards,
/// `created_at` and `updated_at` always carry the same instant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RtpPacket {
    pub id: Uuid,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    /// Raw RTP sequence number, wrap-around is left to the reader
    pub sequence_number: u16,
    /// Media clock units, e.g. 1/90000 s for H.264 video
    pub timestamp: u32,
    pub marker: bool,
    pub ssrc: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
