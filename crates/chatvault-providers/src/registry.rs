use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::ConversationProvider;

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: &'static str,
    pub description: &'static str,
}

const PROVIDERS: &[ProviderMetadata] = &[
    ProviderMetadata {
        name: "openai_chat",
        description: "ChatGPT conversation API",
    },
    ProviderMetadata {
        name: "anthropic_claude",
        description: "Claude.ai conversation API",
    },
    ProviderMetadata {
        name: "google_gemini",
        description: "Gemini app conversation API",
    },
];

pub fn all_providers() -> &'static [ProviderMetadata] {
    PROVIDERS
}

pub fn provider_metadata(name: &str) -> Option<&'static ProviderMetadata> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// Registry of live provider adapters, keyed by provider id.
///
/// Adapters are constructed and registered by the embedding application;
/// the core only resolves them by id at sync time.
#[derive(Default)]
pub struct ProviderRegistry {
    adapters: HashMap<&'static str, Arc<dyn ConversationProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn ConversationProvider>) {
        self.adapters.insert(adapter.id(), adapter);
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn ConversationProvider>> {
        self.adapters.get(provider_id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.adapters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lookup_by_name() {
        assert!(provider_metadata("openai_chat").is_some());
        assert!(provider_metadata("unknown").is_none());
        assert_eq!(all_providers().len(), 3);
    }
}
