//! Provider sections

use serde::{Deserialize, Serialize};

pub use crate::core::providers::anthropic::AnthropicConfig;
pub use crate::core::providers::openai::OpenAIConfig;

/// `providers:` section of the configuration file.
///
/// Both shipped adapters are always registered; one without an API key
/// fails its requests with an authentication error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

impl ProvidersConfig {
    pub fn apply_env(&mut self) {
        self.openai.apply_env();
        self.anthropic.apply_env();
    }
}
