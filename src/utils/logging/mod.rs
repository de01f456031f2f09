//! Logging setup
//!
//! Installs a global `tracing` subscriber. The filter comes from
//! [`LoggingConfig::level`] unless `RUST_LOG` is set.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::utils::error::{LlmBatchError, Result};

/// Build the filter for `config`, preferring `RUST_LOG` when present
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| LlmBatchError::config(format!("Invalid log filter '{}': {}", config.level, e)))
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| LlmBatchError::config(format!("Failed to initialize logging: {}", e)))
}
