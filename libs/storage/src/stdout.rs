use super::{RtpPacket, Storage};

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Emits packets as JSON lines, handy for piping into `jq` or a file.
pub struct StdoutStorage {
    out: Mutex<Stdout>,
}

impl StdoutStorage {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdoutStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for StdoutStorage {
    async fn create_rtp_packet(&self, packet: RtpPacket) -> Result<()> {
        let mut line = serde_json::to_vec(&packet)?;
        line.push(b'\n');
        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        Ok(())
    }
}
