use serde::{Deserialize, Serialize};

/// A single ranked hit returned by a search provider.
///
/// `position` is 1-based and follows the provider's relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub position: u32,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        position: u32,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            position: position.max(1),
        }
    }
}

/// Renumbers positions 1..=n in the current order.
pub fn renumber(results: &mut [SearchResult]) {
    for (i, result) in results.iter_mut().enumerate() {
        result.position = u32::try_from(i + 1).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_at_least_one() {
        let result = SearchResult::new("t", "https://example.com", "s", 0);
        assert_eq!(result.position, 1);
    }

    #[test]
    fn test_renumber() {
        let mut results = vec![
            SearchResult::new("a", "https://a.example", "", 7),
            SearchResult::new("b", "https://b.example", "", 3),
        ];
        renumber(&mut results);
        assert_eq!(results[0].position, 1);
        assert_eq!(results[1].position, 2);
    }
}
