//! Integration tests for llm-batch
//!
//! These tests drive the public API end to end, with instrumented in-memory
//! adapters or a local HTTP mock server standing in for providers.

pub mod batch_engine_tests;
