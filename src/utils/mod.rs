//! Utility modules

pub mod error; // Error handling
pub mod logging; // Tracing subscriber setup

pub use error::{LlmBatchError, Result};
pub use logging::init_logging;
