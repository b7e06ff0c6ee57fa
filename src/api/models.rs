use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP transfer client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    /// Longest wait for the next body chunk before the transfer is failed.
    pub stall_timeout_secs: u64,
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("batch-downloader/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
            stall_timeout_secs: 60,
        }
    }
}
