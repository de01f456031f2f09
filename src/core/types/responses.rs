//! Response types delivered to callers

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::core::providers::unified_provider::ProviderError;

/// Token usage reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Successful chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Provider-assigned response id, when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that produced the response
    pub model: String,
    /// Assistant message
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the assistant message
    pub fn content(&self) -> &str {
        &self.message.content
    }
}

/// Error payload delivered to a caller whose request could not be served.
///
/// Serializes as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{error}")]
pub struct ItemError {
    pub error: String,
}

impl ItemError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<ProviderError> for ItemError {
    fn from(err: ProviderError) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of one batched request
pub type ChatResult = std::result::Result<ChatResponse, ItemError>;
