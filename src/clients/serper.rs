use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::SearchResult;
use crate::models::search::renumber;
use crate::services::providers::SearchProvider;

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    position: Option<u32>,
}

/// Google web search through the Serper API.
#[derive(Clone)]
pub struct SerperClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(client: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let body = serde_json::json!({ "q": query, "num": limit });

        let response = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Serper request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Serper API error: {} - {}", status, body));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let results = parse_organic(parsed, limit);
        debug!(query = %query, count = results.len(), "Serper search finished");
        Ok(results)
    }
}

fn parse_organic(response: SerperResponse, limit: usize) -> Vec<SearchResult> {
    let mut organic = response.organic;
    organic.sort_by_key(|o| o.position.unwrap_or(u32::MAX));

    let mut results: Vec<SearchResult> = organic
        .into_iter()
        .filter(|o| !o.link.is_empty())
        .take(limit)
        .map(|o| SearchResult::new(o.title, o.link, o.snippet, o.position.unwrap_or(1)))
        .collect();

    renumber(&mut results);
    results
}

#[async_trait]
impl SearchProvider for SerperClient {
    fn name(&self) -> &'static str {
        "serper"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        Self::search(self, query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organic() {
        let json = r#"{
            "searchParameters": {"q": "rust"},
            "organic": [
                {"title": "Second", "link": "https://b.example", "snippet": "b", "position": 2},
                {"title": "First", "link": "https://a.example", "snippet": "a", "position": 1},
                {"title": "No link", "link": "", "position": 3},
                {"title": "Fourth", "link": "https://d.example", "position": 4}
            ]
        }"#;

        let response: SerperResponse = serde_json::from_str(json).unwrap();
        let results = parse_organic(response, 10);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "First");
        assert_eq!(results[0].position, 1);
        assert_eq!(results[2].title, "Fourth");
        assert_eq!(results[2].position, 3);
        assert_eq!(results[2].snippet, "");
    }

    #[test]
    fn test_parse_organic_respects_limit() {
        let response: SerperResponse = serde_json::from_str(
            r#"{"organic": [
                {"title": "a", "link": "https://a.example", "position": 1},
                {"title": "b", "link": "https://b.example", "position": 2}
            ]}"#,
        )
        .unwrap();

        assert_eq!(parse_organic(response, 1).len(), 1);
    }

    #[test]
    fn test_missing_organic_is_empty() {
        let response: SerperResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_organic(response, 5).is_empty());
    }
}
