use super::{RtpPacket, Storage};

use anyhow::Result;
use async_trait::async_trait;

use redis::aio::MultiplexedConnection;
use redis::Client;

#[derive(Clone)]
pub struct RedisStorage {
    prefix: String,
    conn: MultiplexedConnection,
}

impl RedisStorage {
    pub async fn new(addr: String, prefix: String) -> Result<Self> {
        let client = Client::open(addr.clone())?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("redis storage connected: {}", addr);
        Ok(RedisStorage { prefix, conn })
    }

    fn packet_key(&self, packet: &RtpPacket) -> String {
        format!("{}:{}", self.prefix, packet.id)
    }

    fn ssrc_key(&self, packet: &RtpPacket) -> String {
        format!("{}:ssrc:{}", self.prefix, packet.ssrc)
    }
}

#[async_trait]
impl Storage for RedisStorage {
    async fn create_rtp_packet(&self, packet: RtpPacket) -> Result<()> {
        let key = self.packet_key(&packet);
        let index = self.ssrc_key(&packet);
        let value = serde_json::to_string(&packet)?;
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .set(&key, value)
            .ignore()
            .zadd(index, &key, packet.created_at.timestamp_millis())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
