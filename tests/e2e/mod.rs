//! End-to-end tests for llm-batch
//!
//! These tests send real requests and require API keys.
//! Run with: cargo test -- --ignored
//!
//! Required environment variables:
//! - OPENAI_API_KEY: For OpenAI tests
//! - ANTHROPIC_API_KEY: For Anthropic tests
