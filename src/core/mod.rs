//! Core functionality
//!
//! The batching engine, the adapter contract, the shipped adapters and the
//! client facade that ties them together.

pub mod batch;
pub mod client;
pub mod providers;
pub mod traits;
pub mod types;

pub use client::{LlmBatch, LlmBatchBuilder};
