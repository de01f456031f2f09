//! Core traits module
//!
//! Contains the abstract interface between the engine and the backends

pub mod adapter;

pub use adapter::{BatchAdapter, BatchItemRequest};
