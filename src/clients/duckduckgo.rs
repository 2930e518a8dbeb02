use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::SearchResult;
use crate::models::search::renumber;
use crate::services::providers::SearchProvider;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

/// Keyless DuckDuckGo Instant Answer lookups.
#[derive(Clone)]
pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
}

impl DuckDuckGoClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("DuckDuckGo request failed")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "DuckDuckGo API error: {}",
                response.status()
            ));
        }

        // Served as application/x-javascript, so decode the text by hand.
        let text = response.text().await?;
        let answer: InstantAnswer =
            serde_json::from_str(&text).context("Failed to parse DuckDuckGo response")?;

        let results = collect_results(answer, limit);
        debug!(query = %query, count = results.len(), "DuckDuckGo search finished");
        Ok(results)
    }
}

fn collect_results(answer: InstantAnswer, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.is_empty() && !answer.abstract_url.is_empty() {
        let title = if answer.heading.is_empty() {
            answer.abstract_url.clone()
        } else {
            answer.heading.clone()
        };
        results.push(SearchResult::new(
            title,
            answer.abstract_url,
            answer.abstract_text,
            1,
        ));
    }

    let mut stack: Vec<RelatedTopic> = answer.related_topics.into_iter().rev().collect();
    while let Some(topic) = stack.pop() {
        if results.len() >= limit {
            break;
        }
        match topic {
            RelatedTopic::Topic { text, first_url } => {
                if text.is_empty() || first_url.is_empty() {
                    continue;
                }
                let title = topic_title(&text);
                results.push(SearchResult::new(title, first_url, text, 1));
            }
            RelatedTopic::Group { topics } => stack.extend(topics.into_iter().rev()),
        }
    }

    results.truncate(limit);
    renumber(&mut results);
    results
}

/// Related topics carry "Title - description" in a single text field.
fn topic_title(text: &str) -> String {
    let title = text.split(" - ").next().unwrap_or(text).trim();
    if title.chars().count() > 80 {
        format!("{}…", title.chars().take(80).collect::<String>())
    } else {
        title.to_string()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        Self::search(self, query, limit).await
    }
}
