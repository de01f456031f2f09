//! Batching engine settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{default_batch_size, default_window_ms};
use crate::core::batch::BatchConfig;

/// `batch:` section of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Flush a key as soon as this many requests are pending
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// How long a partial batch may wait for company, in milliseconds.
    /// Zero flushes as soon as the key is idle.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            window_ms: default_window_ms(),
        }
    }
}

impl BatchSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn to_batch_config(&self) -> BatchConfig {
        BatchConfig::new()
            .with_batch_size(self.batch_size)
            .with_window(self.window())
    }
}
