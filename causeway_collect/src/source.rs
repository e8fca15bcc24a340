//! The knowledge-source trait and offline implementations.

use causeway_core::types::{CuratorQuery, EvidenceBundle, Snippet};

/// Errors raised while collecting snippets from an external source.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A source of evidence snippets for curator queries.
///
/// Contract: [`KnowledgeSource::collect`] returns a bundle whose channels
/// each hold zero or more snippets; it must not fail the pipeline. Per-term
/// lookup failures are swallowed (logged by the implementation) and surface
/// as missing snippets.
pub trait KnowledgeSource {
    /// Collects evidence for one query.
    fn collect(&self, query: &CuratorQuery) -> EvidenceBundle;
}

/// A fixed-snippet source for offline runs and tests.
///
/// Every query receives the same snippets on the primary channel.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    snippets: Vec<Snippet>,
}

impl StaticSource {
    /// Creates a source that always returns `snippets`.
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }

    /// A source that returns no evidence at all.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl KnowledgeSource for StaticSource {
    fn collect(&self, _query: &CuratorQuery) -> EvidenceBundle {
        EvidenceBundle {
            wikipedia_snippets: self.snippets.clone(),
            ..Default::default()
        }
        .assemble()
    }
}
