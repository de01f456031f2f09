//! Provider Registry
//!
//! Name → adapter lookup for the client facade

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::traits::BatchAdapter;
use crate::utils::error::{LlmBatchError, Result};

/// Registry of backend adapters keyed by [`BatchAdapter::name`]
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn BatchAdapter>>,
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any adapter with the same name
    pub fn register(&mut self, adapter: Arc<dyn BatchAdapter>) {
        self.providers.insert(adapter.name().to_string(), adapter);
    }

    /// Look up an adapter, failing with a configuration error for unknown names
    pub fn get(&self, name: &str) -> Result<Arc<dyn BatchAdapter>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| LlmBatchError::unsupported_provider(name))
    }

    /// Check if provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// List all registered providers, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field("providers", &self.list())
            .finish()
    }
}
