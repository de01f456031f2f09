//! OpenAI chat-completions adapter

pub mod client;
pub mod config;

pub use client::OpenAIProvider;
pub use config::OpenAIConfig;
