//! Question answering: a search chain feeding an answer chain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::models::search::renumber;
use crate::models::{ChatTurn, SearchResult};
use crate::services::fallback::FallbackChain;
use crate::services::formatter::{self, QueryIntent};
use crate::services::providers::ProviderRegistry;

pub const SYSTEM_PROMPT: &str = "You are CKS AI, a concise research assistant. \
Answer in Markdown. Use the numbered search results when they are relevant and \
cite them as [n]. If the results do not cover the question, say so briefly.";

pub const APOLOGY: &str =
    "Sorry, I could not put together an answer right now. Please try again in a moment.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
    pub intent: QueryIntent,
}

#[derive(Clone)]
pub struct ChatService {
    registry: ProviderRegistry,
    max_results: usize,
    main_points: usize,
}

impl ChatService {
    #[must_use]
    pub fn new(registry: ProviderRegistry, config: &ChatConfig) -> Self {
        Self {
            registry,
            max_results: config.max_results.max(1),
            main_points: config.main_points,
        }
    }

    /// Never fails: upstream errors are absorbed by the chains.
    pub async fn respond(&self, message: &str) -> ChatReply {
        let query = message.trim();
        let intent = formatter::classify(query);

        let sources = self.search(query).await;
        debug!(query = %query, results = sources.len(), intent = intent.as_str(), "Search finished");

        let response = self.answer(query, &sources).await;
        info!(intent = intent.as_str(), sources = sources.len(), "Chat answered");

        ChatReply {
            response,
            sources,
            timestamp: Utc::now(),
            intent,
        }
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let limit = self.max_results;
        let mut chain = FallbackChain::new("search");

        for provider in self.registry.search_providers() {
            let provider = Arc::clone(provider);
            chain = chain.then(provider.name(), move || async move {
                provider.search(query, limit).await
            });
        }

        let mut results = chain.run_or_default().await;
        results.truncate(limit);
        renumber(&mut results);
        results
    }

    async fn answer(&self, query: &str, sources: &[SearchResult]) -> String {
        let turns = build_turns(query, sources);
        let turns = turns.as_slice();
        let main_points = self.main_points;

        let mut chain = FallbackChain::new("answer");
        for provider in self.registry.completion_providers() {
            let provider = Arc::clone(provider);
            chain = chain.then(provider.name(), move || async move {
                provider.complete(turns).await
            });
        }

        chain
            .then("local", move || async move {
                Ok(formatter::format_response(query, sources, main_points))
            })
            .run_or_else(|| APOLOGY.to_string())
            .await
    }
}

/// System prompt, the numbered search context (if any) and the question.
#[must_use]
pub fn build_turns(query: &str, sources: &[SearchResult]) -> Vec<ChatTurn> {
    let mut turns = vec![ChatTurn::system(SYSTEM_PROMPT)];

    if !sources.is_empty() {
        let context = sources
            .iter()
            .map(|r| format!("[{}] {} ({})\n{}", r.position, r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");
        turns.push(ChatTurn::system(format!("Search results:\n\n{context}")));
    }

    turns.push(ChatTurn::user(query));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::services::providers::{CompletionProvider, SearchProvider};
    use async_trait::async_trait;

    struct BrokenSearch;

    #[async_trait]
    impl SearchProvider for BrokenSearch {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<SearchResult>> {
            anyhow::bail!("connection refused")
        }
    }

    struct StaticSearch(usize);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn search(&self, _query: &str, _limit: usize) -> anyhow::Result<Vec<SearchResult>> {
            Ok((0..self.0)
                .map(|i| {
                    SearchResult::new(
                        format!("Result {i}"),
                        format!("https://example.com/{i}"),
                        "Photosynthesis converts light into chemical energy.",
                        u32::try_from(i + 7).unwrap(),
                    )
                })
                .collect())
        }
    }

    struct FixedCompletion(Option<&'static str>);

    #[async_trait]
    impl CompletionProvider for FixedCompletion {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn complete(&self, turns: &[ChatTurn]) -> anyhow::Result<String> {
            assert_eq!(turns.first().map(|t| t.role), Some(ChatRole::System));
            self.0
                .map(ToString::to_string)
                .ok_or_else(|| anyhow::anyhow!("quota exceeded"))
        }
    }

    fn service(registry: ProviderRegistry) -> ChatService {
        ChatService::new(registry, &ChatConfig::default())
    }

    #[tokio::test]
    async fn test_no_providers_answers_locally() {
        let reply = service(ProviderRegistry::empty())
            .respond("What is photosynthesis")
            .await;

        assert!(reply.sources.is_empty());
        assert_eq!(reply.intent, QueryIntent::Definition);
        assert!(reply.response.contains("## Definition"));
    }

    #[tokio::test]
    async fn test_search_falls_through_and_is_truncated() {
        let registry = ProviderRegistry::empty()
            .with_search(Arc::new(BrokenSearch))
            .with_search(Arc::new(StaticSearch(9)));

        let reply = service(registry).respond("What is photosynthesis").await;

        assert_eq!(reply.sources.len(), 5);
        let positions: Vec<u32> = reply.sources.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
        assert!(reply.response.contains("https://example.com/0"));
    }

    #[tokio::test]
    async fn test_completion_provider_wins() {
        let registry = ProviderRegistry::empty()
            .with_completion(Arc::new(FixedCompletion(Some("From the model."))));

        let reply = service(registry).respond("How to bake bread").await;
        assert_eq!(reply.response, "From the model.");
    }

    #[tokio::test]
    async fn test_failed_completion_falls_back_to_formatter() {
        let registry =
            ProviderRegistry::empty().with_completion(Arc::new(FixedCompletion(None)));

        let reply = service(registry).respond("How to bake bread").await;
        assert!(reply.response.starts_with("## Guide"));
    }

    #[test]
    fn test_build_turns() {
        let turns = build_turns("q", &[]);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, ChatRole::User);

        let sources = vec![SearchResult::new("T", "https://t.example", "S", 1)];
        let turns = build_turns("q", &sources);
        assert_eq!(turns.len(), 3);
        assert!(turns[1].content.contains("[1] T (https://t.example)"));
    }
}
