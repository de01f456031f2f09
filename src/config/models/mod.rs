//! Configuration data models

pub mod batch;
pub mod logging;
pub mod provider;

pub use batch::*;
pub use logging::*;
pub use provider::*;

/// Default batch size
pub fn default_batch_size() -> usize {
    crate::core::batch::DEFAULT_BATCH_SIZE
}

/// Default batch window in milliseconds
pub fn default_window_ms() -> u64 {
    crate::core::batch::DEFAULT_WINDOW.as_millis() as u64
}

/// Default log filter
pub fn default_log_level() -> String {
    "info".to_string()
}
