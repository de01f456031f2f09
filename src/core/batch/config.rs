//! Engine configuration

use std::time::Duration;

use crate::utils::error::{LlmBatchError, Result};

/// Default number of requests that forces a flush
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default time a partial batch may wait before it is flushed
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// Configuration for [`BatchEngine`](super::BatchEngine)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Queue length at which a flush starts immediately; also the largest
    /// number of requests sent in one batch call
    pub batch_size: usize,
    /// Longest a request waits on an idle key before its batch is flushed.
    /// `Duration::ZERO` flushes as soon as the key is idle.
    pub window: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            window: DEFAULT_WINDOW,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_window_ms(self, window_ms: u64) -> Self {
        self.with_window(Duration::from_millis(window_ms))
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LlmBatchError::config("batch_size must be a positive integer"));
        }
        Ok(())
    }
}
