use serde::{Deserialize, Serialize};

/// Storage backend configuration for captured RTP packets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Write every packet as one JSON line on stdout
    Stdout,
    /// Keep packets in process memory
    Memory,
    /// Redis standalone server
    Redis {
        /// Connection url, e.g. `redis://127.0.0.1:6379`
        addr: String,
        /// Key prefix for packet entries and per-SSRC indexes
        #[serde(default = "default_redis_prefix")]
        prefix: String,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Stdout
    }
}

fn default_redis_prefix() -> String {
    "rtpsniff:packet".to_string()
}
