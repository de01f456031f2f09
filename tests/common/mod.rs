//! Common test utilities for llm-batch
//!
//! This module provides shared test infrastructure for all tests:
//! - Instrumented in-memory adapters
//! - Test fixtures and data factories
//! - Custom assertions and helpers
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{fixtures, providers::MockAdapter};
//!
//! #[tokio::test(start_paused = true)]
//! async fn my_test() {
//!     let adapter = MockAdapter::new("mock").shared();
//!     let client = fixtures::client_with(adapter.clone(), 10, Duration::from_millis(50));
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod providers;

// Re-export commonly used items
pub use fixtures::{PromptFactory, client_with};
pub use providers::{BatchMode, MockAdapter};

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// Skip test if API key is not available
#[macro_export]
macro_rules! skip_without_api_key {
    ($provider:expr) => {
        let key_var = match $provider {
            "openai" => "OPENAI_API_KEY",
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => {
                panic!("Unknown provider: {}", $provider);
            }
        };
        if std::env::var(key_var).is_err() {
            eprintln!("Skipping test: {} not set for {} provider", key_var, $provider);
            return;
        }
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
