use super::{RtpPacket, Storage};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStorage {
    packets: RwLock<Vec<RtpPacket>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored packet, in insertion order
    pub async fn packets(&self) -> Vec<RtpPacket> {
        self.packets.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.packets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.packets.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_rtp_packet(&self, packet: RtpPacket) -> Result<()> {
        self.packets.write().await.push(packet);
        Ok(())
    }
}
