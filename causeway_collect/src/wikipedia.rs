//! Wikipedia REST summary client.
//!
//! Fetches page summaries for the local-event text, extracted entities,
//! commodities mentioned in the query, and the leading context keywords.
//! Each term is looked up at most once per process (in-memory cache), and a
//! fixed delay between outbound requests keeps the client well under the
//! API's rate expectations. Lookup failures are logged and yield zero
//! snippets; they never fail the pipeline.

use crate::source::{CollectError, KnowledgeSource};
use causeway_core::types::{CuratorQuery, EvidenceBundle, Snippet, COMMODITY_VOCABULARY};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Client settings.
#[derive(Debug, Clone)]
pub struct WikipediaConfig {
    /// REST summary endpoint prefix; the page title is appended.
    pub base_url: String,
    /// Delay inserted before every outbound request.
    pub request_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How many context keywords to look up per query.
    pub max_keywords: usize,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string(),
            request_delay: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
            max_keywords: 5,
        }
    }
}

/// Shape of the REST summary response, reduced to the fields we keep.
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    #[serde(default)]
    page: String,
}

/// Rate-limited, cached Wikipedia summary source.
pub struct WikipediaSource {
    client: reqwest::blocking::Client,
    config: WikipediaConfig,
    cache: Mutex<HashMap<String, Vec<Snippet>>>,
}

impl WikipediaSource {
    /// Creates a source with the given settings.
    pub fn new(config: WikipediaConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent("causeway/0.4 (curatorial research tool)")
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up one search term, consulting the cache first.
    ///
    /// Returns zero or more snippets; transport or decode failures are
    /// converted to an empty result by the caller.
    pub fn search(&self, term: &str) -> Result<Vec<Snippet>, CollectError> {
        if let Some(cached) = self.cache.lock().expect("cache lock").get(term) {
            return Ok(cached.clone());
        }

        std::thread::sleep(self.config.request_delay);

        let title = term.replace(' ', "_");
        let url = format!("{}{}", self.config.base_url, title);
        let response = self.client.get(&url).send()?;

        let mut snippets = Vec::new();
        if response.status().is_success() {
            let summary: SummaryResponse = response.json()?;
            if !summary.extract.is_empty() {
                snippets.push(Snippet {
                    title: summary.title,
                    extract: summary.extract,
                    url: summary
                        .content_urls
                        .and_then(|u| u.desktop)
                        .map(|d| d.page)
                        .unwrap_or_default(),
                    source: "wikipedia".to_string(),
                });
            }
        }

        self.cache
            .lock()
            .expect("cache lock")
            .insert(term.to_string(), snippets.clone());
        Ok(snippets)
    }

    fn search_or_empty(&self, term: &str) -> Vec<Snippet> {
        match self.search(term) {
            Ok(snippets) => snippets,
            Err(err) => {
                tracing::debug!(term, error = %err, "snippet lookup failed");
                Vec::new()
            }
        }
    }
}

impl KnowledgeSource for WikipediaSource {
    fn collect(&self, query: &CuratorQuery) -> EvidenceBundle {
        let mut bundle = EvidenceBundle::default();

        bundle
            .wikipedia_snippets
            .extend(self.search_or_empty(&query.local_event_text));

        for entity in &query.entities {
            bundle.entity_mentions.extend(self.search_or_empty(entity));
        }

        for commodity in extract_commodities(&query.local_event_text) {
            bundle
                .related_commodities
                .extend(self.search_or_empty(&commodity));
        }

        for keyword in query.keywords.iter().take(self.config.max_keywords) {
            bundle.context_keywords.extend(self.search_or_empty(keyword));
        }

        bundle.assemble()
    }
}

/// Commodity mentions in the query text, capitalized for page lookup.
pub fn extract_commodities(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    COMMODITY_VOCABULARY
        .iter()
        .filter(|commodity| text.contains(*commodity))
        .map(|commodity| {
            let mut chars = commodity.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
