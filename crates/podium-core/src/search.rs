//! Web search.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PodiumConfig;
use crate::error::{Result, ServiceError};

const PROVIDER: &str = "tavily";

/// Tavily search endpoint.
const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Search outcome: a synthesized answer plus the supporting hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Direct answer, empty when the provider gave none.
    pub content: String,
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Best short text for speech: the answer, else the first hit.
    pub fn best_text(&self) -> Option<&str> {
        Some(self.content.trim())
            .filter(|c| !c.is_empty())
            .or_else(|| {
                self.results
                    .iter()
                    .map(|r| r.content.trim())
                    .find(|c| !c.is_empty())
            })
    }

    /// Display rendering: answer followed by up to `max_sources` sources.
    pub fn format_for_display(&self, query: &str, max_sources: usize) -> String {
        let mut out = format!("🔎 Результаты поиска по запросу «{}»", query);
        if let Some(text) = self.best_text() {
            out.push_str("\n\n");
            out.push_str(text);
        }
        let sources: Vec<_> = self.results.iter().take(max_sources).collect();
        if !sources.is_empty() {
            out.push_str("\n\nИсточники:");
            for (i, hit) in sources.iter().enumerate() {
                out.push_str(&format!("\n{}. {} - {}", i + 1, hit.title, hit.url));
            }
        }
        out
    }
}

/// A web search backend.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse>;
}

/// Tavily search client.
#[derive(Clone)]
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    max_results: u32,
    search_depth: &'static str,
    timeout: Duration,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            max_results: 5,
            search_depth: "basic",
            timeout: Duration::from_secs(30),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotConfigured` without an API key.
    pub fn from_config(config: &PodiumConfig) -> Result<Self> {
        let api_key = config
            .tavily_api_key
            .clone()
            .ok_or_else(|| ServiceError::NotConfigured(PROVIDER.to_string()))?;
        Ok(Self::new(api_key).with_timeout(config.request_timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Use Tavily's slower, more thorough search.
    pub fn advanced(mut self) -> Self {
        self.search_depth = "advanced";
        self
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl From<TavilyResponse> for SearchResponse {
    fn from(raw: TavilyResponse) -> Self {
        Self {
            content: raw.answer.unwrap_or_default().trim().to_string(),
            results: raw.results,
        }
    }
}

#[async_trait]
impl SearchService for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: self.search_depth,
            max_results: self.max_results,
            include_answer: true,
        };

        let response = self
            .client
            .post(TAVILY_API_URL)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, self.timeout.as_secs()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("Tavily rate limit");
            return Err(ServiceError::RateLimited(PROVIDER.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        debug!(query = %query, hits = raw.results.len(), "Search completed");
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, content: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: format!("https://example.org/{}", title),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_best_text_prefers_answer() {
        let response = SearchResponse {
            content: "Ответ".into(),
            results: vec![hit("a", "Первый")],
        };
        assert_eq!(response.best_text(), Some("Ответ"));

        let response = SearchResponse {
            content: "  ".into(),
            results: vec![hit("a", ""), hit("b", "Второй")],
        };
        assert_eq!(response.best_text(), Some("Второй"));
    }

    #[test]
    fn test_display_lists_at_most_three_sources() {
        let response = SearchResponse {
            content: "Кратко".into(),
            results: vec![hit("a", ""), hit("b", ""), hit("c", ""), hit("d", "")],
        };
        let text = response.format_for_display("погода", 3);
        assert!(text.contains("«погода»"));
        assert!(text.contains("3. c"));
        assert!(!text.contains("4. d"));
    }

    #[test]
    fn test_tavily_payload_conversion() {
        let raw: TavilyResponse = serde_json::from_str(
            r#"{"answer":" 42 ","results":[{"title":"t","url":"u","content":"c","score":0.9}]}"#,
        )
        .unwrap();
        let response: SearchResponse = raw.into();
        assert_eq!(response.content, "42");
        assert_eq!(response.results.len(), 1);
    }
}
