//! Backend adapters
//!
//! Each shipped provider implements [`BatchAdapter`](crate::core::traits::BatchAdapter)
//! over its HTTP API. Custom backends register through the same trait.

// Shared HTTP plumbing
pub mod base;

// Provider modules
pub mod anthropic;
pub mod openai;

// Registry and unified error
pub mod provider_registry;
pub mod unified_provider;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider_registry::ProviderRegistry;
pub use unified_provider::ProviderError;
