//! # llm-batch
//!
//! Transparent request batching for chat-completion providers.
//!
//! Requests that opt in are queued per `(provider, model)` and sent as one
//! batch call once the batch is full or its window has elapsed. When a batch
//! call fails, every request in it is retried on its own, and each caller
//! receives exactly one result.
//!
//! ## Features
//!
//! - **Per-key queues**: one FIFO queue per provider and model
//! - **One flush in flight per key**: requests arriving mid-flush wait for the next batch
//! - **Per-item fallback**: a failed batch never takes down unrelated callers
//! - **Pluggable backends**: OpenAI and Anthropic ship; anything implementing
//!   [`BatchAdapter`] can be registered
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_batch::{ChatOptions, Config, LlmBatch, user_message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LlmBatch::new(&Config::from_env()?)?;
//!
//!     // One-shot
//!     let response = client
//!         .chat("openai", vec![user_message("Hello!")], ChatOptions::new())
//!         .await?;
//!     println!("{}", response.content());
//!
//!     // Batched: coalesced with other requests for the same model
//!     let response = client
//!         .chat("anthropic", vec![user_message("Hello!")], ChatOptions::batched())
//!         .await?;
//!     println!("{}", response.content());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{LlmBatchError, Result};

pub use crate::core::batch::{BatchConfig, BatchEngine, BatchTicket, MetricsSnapshot, QueueKey};
pub use crate::core::client::{LlmBatch, LlmBatchBuilder};
pub use crate::core::providers::{
    AnthropicConfig, AnthropicProvider, OpenAIConfig, OpenAIProvider, ProviderError,
    ProviderRegistry,
};
pub use crate::core::traits::{BatchAdapter, BatchItemRequest};
pub use crate::core::types::{
    ChatMessage, ChatOptions, ChatResponse, ChatResult, ItemError, MessageRole, Usage,
    assistant_message, system_message, user_message,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
