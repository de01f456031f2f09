//! Custom test assertions

use llm_batch::{ChatResponse, ItemError};

use super::providers::MockAdapter;

/// Assertions for ChatResponse
pub trait ChatResponseAssertions {
    /// Assert the response answers `prompt` as [`MockAdapter`] would
    fn assert_echoes(&self, prompt: &str);

    /// Assert response has usage information
    fn assert_has_usage(&self);
}

impl ChatResponseAssertions for ChatResponse {
    fn assert_echoes(&self, prompt: &str) {
        assert_eq!(
            self.content(),
            MockAdapter::reply_to(prompt),
            "Response was delivered to the wrong caller"
        );
    }

    fn assert_has_usage(&self) {
        let usage = self
            .usage
            .as_ref()
            .expect("Expected response to have usage information");
        assert!(usage.total_tokens > 0, "Expected positive total_tokens");
    }
}

/// Assert an item error mentions `needle`
pub fn assert_item_error_contains(error: &ItemError, needle: &str) {
    assert!(
        error.error.contains(needle),
        "Expected error containing '{}', got '{}'",
        needle,
        error.error
    );
}
