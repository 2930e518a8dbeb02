//! Capability registry for optional upstream integrations.
//!
//! Built once at start from [`Config`]; services receive the registry instead
//! of inspecting configuration at call sites. An empty registry is valid and
//! means every request is answered locally.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::clients::{DuckDuckGoClient, OpenAiClient, SerperClient};
use crate::config::Config;
use crate::models::{ChatTurn, SearchResult};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<SearchResult>>;
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, turns: &[ChatTurn]) -> anyhow::Result<String>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    search: Vec<Arc<dyn SearchProvider>>,
    completion: Vec<Arc<dyn CompletionProvider>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderSummary {
    pub search: Vec<&'static str>,
    pub completion: Vec<&'static str>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers providers in fallback order: keyed search first, then the
    /// keyless one; one completion provider when AI is enabled and usable.
    #[must_use]
    pub fn from_config(config: &Config, http: &reqwest::Client) -> Self {
        let mut registry = Self::empty();

        if let Some(key) = config.search.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            registry = registry.with_search(Arc::new(SerperClient::new(
                http.clone(),
                config.search.api_url.clone(),
                key,
            )));
        }

        if config.search.duckduckgo_enabled {
            registry = registry.with_search(Arc::new(DuckDuckGoClient::new(
                http.clone(),
                config.search.duckduckgo_url.clone(),
            )));
        }

        if config.ai.is_usable() {
            registry = registry.with_completion(Arc::new(OpenAiClient::new(http.clone(), &config.ai)));
        }

        let summary = registry.summary();
        info!(
            search = ?summary.search,
            completion = ?summary.completion,
            "Provider registry initialized"
        );

        registry
    }

    #[must_use]
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search.push(provider);
        self
    }

    #[must_use]
    pub fn with_completion(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion.push(provider);
        self
    }

    #[must_use]
    pub fn search_providers(&self) -> &[Arc<dyn SearchProvider>] {
        &self.search
    }

    #[must_use]
    pub fn completion_providers(&self) -> &[Arc<dyn CompletionProvider>] {
        &self.completion
    }

    #[must_use]
    pub fn summary(&self) -> ProviderSummary {
        ProviderSummary {
            search: self.search.iter().map(|p| p.name()).collect(),
            completion: self.completion.iter().map(|p| p.name()).collect(),
        }
    }
}
