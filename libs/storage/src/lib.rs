pub mod config;
pub mod memory;
pub mod model;
pub mod redis;
pub mod stdout;

#[cfg(test)]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

pub use config::StorageConfig;
pub use memory::MemoryStorage;
pub use model::RtpPacket;

use self::redis::RedisStorage;
use self::stdout::StdoutStorage;

#[async_trait]
pub trait Storage {
    async fn create_rtp_packet(&self, packet: RtpPacket) -> Result<()>;
}

pub async fn new(config: StorageConfig) -> Result<Box<dyn Storage + Send + Sync + 'static>> {
    tracing::debug!("creating storage for config: {:?}", config);
    match config {
        StorageConfig::Stdout => Ok(Box::new(StdoutStorage::new())),
        StorageConfig::Memory => Ok(Box::new(MemoryStorage::new())),
        StorageConfig::Redis { addr, prefix } => {
            Ok(Box::new(RedisStorage::new(addr, prefix).await?))
        }
    }
}
