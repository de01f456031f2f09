//! Error handling utilities
//!
//! Crate-level error type and result alias.

pub mod error;

pub use error::*;
