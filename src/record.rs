use chrono::Utc;
use storage::RtpPacket;
use uuid::Uuid;
use webrtc::rtp::header::Header;

use crate::extract::Endpoints;

/// Builds the stored record from the extracted endpoints and the decoded
/// RTP header. Every call gets a fresh id and a single creation instant.
pub fn assemble(endpoints: Endpoints, header: &Header) -> RtpPacket {
    let now = Utc::now();
    RtpPacket {
        id: Uuid::new_v4(),
        src_ip: endpoints.src_ip,
        dst_ip: endpoints.dst_ip,
        src_port: endpoints.src_port,
        dst_port: endpoints.dst_port,
        sequence_number: header.sequence_number,
        timestamp: header.timestamp,
        marker: header.marker,
        ssrc: header.ssrc,
        created_at: now,
        updated_at: now,
    }
}
