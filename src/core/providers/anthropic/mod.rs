//! Anthropic messages adapter

pub mod client;
pub mod config;

pub use client::AnthropicProvider;
pub use config::AnthropicConfig;
