//! Dual-mode causal link prediction.
//!
//! For every candidate global node the predictor resolves one
//! [`PredictionSource`] up front:
//!
//! - **Embedded** — both endpoints exist in the persisted base graph and a
//!   bounded BFS finds a connecting path there; the causal strength is the
//!   mean-pooled GCN embedding of the best path's nodes.
//! - **EdgeFallback** — the common case for query-time candidates: the
//!   causal strength is read from the subgraph edge built by the graph
//!   constructor, with small multiplicative boosts from its metadata.
//!
//! A missing or malformed base graph never raises past this boundary; every
//! candidate simply degrades to the fallback path.

use crate::gcn::{normalized_adjacency, GcnModel};
use crate::mechanism::MechanismInference;
use causeway_core::loader::BaseGraph;
use causeway_core::types::{
    NodeKind, Prediction, PredictionSource, Subgraph,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Search bounds and fallback boosts; calibration constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Maximum hops for base-graph path search.
    pub max_depth: usize,
    /// Maximum base-graph paths collected per candidate.
    pub max_paths: usize,
    /// Fallback boost when edge temporal relevance exceeds 0.7.
    pub temporal_boost: f32,
    /// Fallback boost when edge keyword match exceeds 0.5.
    pub keyword_boost: f32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_paths: 5,
            temporal_boost: 1.1,
            keyword_boost: 1.05,
        }
    }
}

/// Predicts causal links between subgraph candidates and the local event.
pub struct LinkPredictor {
    base: Option<Arc<BaseGraph>>,
    model: GcnModel,
    mechanisms: MechanismInference,
    config: PredictorConfig,
}

impl LinkPredictor {
    /// Creates a predictor over an optional base graph.
    ///
    /// `base` is `None` when the persisted graph was missing or malformed;
    /// prediction then always takes the fallback path.
    pub fn new(
        base: Option<Arc<BaseGraph>>,
        model: GcnModel,
        mechanisms: MechanismInference,
        config: PredictorConfig,
    ) -> Self {
        if base.is_none() {
            tracing::warn!("no base graph available; link prediction will use edge fallback only");
        }
        Self {
            base,
            model,
            mechanisms,
            config,
        }
    }

    /// Predicts links for every global candidate in the subgraph, sorted by
    /// causal strength descending and truncated to `top_k`.
    pub fn predict_links(
        &self,
        subgraph: &Subgraph,
        local_id: &str,
        top_k: usize,
    ) -> Vec<Prediction> {
        // Node embeddings are computed at most once per call, lazily, and
        // only when some candidate actually takes the embedded path.
        let mut embeddings: Option<Array2<f32>> = None;

        let mut predictions: Vec<Prediction> = subgraph
            .nodes_of_kind(NodeKind::Global)
            .filter_map(|candidate| {
                let source = self.resolve_source(&candidate.id, local_id, &mut embeddings);
                let (causal_strength, source) = match source {
                    Some(resolved) => resolved,
                    None => self.fallback(subgraph, &candidate.id, local_id)?,
                };
                let mechanisms = self
                    .mechanisms
                    .infer(&candidate.attributes.name, &candidate.attributes.description);
                Some(Prediction {
                    global_event_id: candidate.id.clone(),
                    local_event_id: local_id.to_string(),
                    causal_strength,
                    source,
                    mechanisms,
                })
            })
            .collect();

        predictions.sort_by(|a, b| {
            b.causal_strength
                .partial_cmp(&a.causal_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        predictions.truncate(top_k);
        predictions
    }

    /// Attempts the embedded path for one candidate.
    ///
    /// Returns `None` when the base graph is absent, either endpoint is not
    /// persisted, or no connecting path exists within the search bounds.
    fn resolve_source(
        &self,
        global_id: &str,
        local_id: &str,
        embeddings: &mut Option<Array2<f32>>,
    ) -> Option<(f32, PredictionSource)> {
        let base = self.base.as_ref()?;
        let source_idx = base.index_of(global_id)?;
        let target_idx = base.index_of(local_id)?;

        let paths = self.find_base_paths(base, source_idx, target_idx);
        let best = paths.into_iter().next()?;

        let embeddings = embeddings.get_or_insert_with(|| self.embed_base(base));
        let score = self.model.pool_path_score(embeddings, &best);
        tracing::debug!(global = global_id, score, "embedded path prediction");
        Some((score, PredictionSource::Embedded { path: best }))
    }

    /// Edge-weight fallback for candidates without a base-graph path.
    fn fallback(
        &self,
        subgraph: &Subgraph,
        global_id: &str,
        local_id: &str,
    ) -> Option<(f32, PredictionSource)> {
        let edge = subgraph.edge_between(global_id, local_id)?;
        let mut score = edge.weight;
        if edge.metadata_f64("temporal_relevance").unwrap_or(0.0) > 0.7 {
            score = (score * self.config.temporal_boost).min(1.0);
        }
        if edge.metadata_f64("keyword_match").unwrap_or(0.0) > 0.5 {
            score = (score * self.config.keyword_boost).min(1.0);
        }
        Some((
            score.min(1.0),
            PredictionSource::EdgeFallback {
                edge_id: edge.id.clone(),
            },
        ))
    }

    /// Bounded BFS over the base graph: shortest paths first, no node
    /// revisited within a path, at most `max_paths` collected.
    fn find_base_paths(
        &self,
        base: &BaseGraph,
        source: usize,
        target: usize,
    ) -> Vec<Vec<usize>> {
        let mut paths = Vec::new();
        let mut queue: std::collections::VecDeque<Vec<usize>> = std::collections::VecDeque::new();
        queue.push_back(vec![source]);

        while let Some(path) = queue.pop_front() {
            if paths.len() >= self.config.max_paths {
                break;
            }
            let current = *path.last().expect("paths are never empty");

            if current == target && path.len() > 1 {
                paths.push(path);
                continue;
            }
            if path.len() > self.config.max_depth {
                continue;
            }

            for &next in base.successors(current) {
                if path.contains(&next) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(next);
                queue.push_back(extended);
            }
        }

        paths
    }

    fn embed_base(&self, base: &BaseGraph) -> Array2<f32> {
        let features = Array2::from_shape_fn(
            (base.node_count(), self.model.config().input_dim),
            |(i, j)| base.features()[i].get(j).copied().unwrap_or(0.0),
        );
        let adjacency = normalized_adjacency(base.node_count(), base.edge_endpoints());
        self.model.embed(&features, &adjacency)
    }
}
