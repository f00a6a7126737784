use std::env;

use serde::{Deserialize, Serialize};
use storage::StorageConfig;

use crate::classifier::RtpFilter;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub capture: Capture,
    #[serde(default)]
    pub filter: RtpFilter,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Device to capture on when none is given on the command line
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.filter.payload_types.is_empty() {
            return Err(anyhow::anyhow!(
                "filter error: empty payload type range {:?}",
                self.filter.payload_types
            ));
        }
        if self.filter.version > 3 {
            return Err(anyhow::anyhow!(
                "filter error: rtp version {} does not fit in two bits",
                self.filter.version
            ));
        }
        if let Some(device) = &self.capture.device {
            if device.is_empty() {
                return Err(anyhow::anyhow!("capture error: empty device name"));
            }
        }
        Ok(())
    }
}
