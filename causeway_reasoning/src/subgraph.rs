//! Per-query subgraph construction.
//!
//! Builds the graph scoped to one curator query: the local node first (when
//! resolved from the base registry), up to 20 candidate global nodes in
//! ranking order, and intermediate bridge nodes synthesized from evidence
//! (commodities) and candidate locations (geopolitical entities). Edge and
//! node ids are deterministic and query-local.

use causeway_core::loader::temporal_gap_days;
use causeway_core::overrides::OverrideTable;
use causeway_core::types::{
    Candidate, Edge, EdgeType, EventAttributes, EvidenceBundle, Node, NodeKind, Subgraph, Value,
    COMMODITY_VOCABULARY,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Construction limits; calibration constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubgraphConfig {
    /// Maximum candidate global nodes added to the subgraph.
    pub max_candidates: usize,
    /// Maximum candidates linked through each intermediate node.
    pub max_bridged_candidates: usize,
    /// Maximum intermediate entity nodes synthesized from locations.
    pub max_entities: usize,
    /// Fixed weight of candidate -> intermediate mention edges.
    pub mention_weight: f32,
    /// Fixed weight of intermediate -> local relation edges.
    pub relation_weight: f32,
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            max_bridged_candidates: 10,
            max_entities: 5,
            mention_weight: 0.5,
            relation_weight: 0.6,
        }
    }
}

/// Builds per-query subgraphs from ranked candidates and evidence.
#[derive(Debug, Clone)]
pub struct SubgraphBuilder {
    commodity_vocabulary: Vec<String>,
    overrides: Arc<OverrideTable>,
    config: SubgraphConfig,
}

impl SubgraphBuilder {
    /// Creates a builder with an injected commodity vocabulary.
    pub fn new(
        commodity_vocabulary: Vec<String>,
        overrides: Arc<OverrideTable>,
        config: SubgraphConfig,
    ) -> Self {
        Self {
            commodity_vocabulary,
            overrides,
            config,
        }
    }

    /// A builder with the default commodity vocabulary.
    pub fn with_defaults(overrides: Arc<OverrideTable>) -> Self {
        Self::new(
            COMMODITY_VOCABULARY.iter().map(|c| c.to_string()).collect(),
            overrides,
            SubgraphConfig::default(),
        )
    }

    /// Constructs the subgraph for one query.
    ///
    /// `local_node` is the resolved local event (index 0 when present);
    /// candidates are added in ranking order.
    pub fn build(
        &self,
        local_node: Option<Node>,
        candidates: &[Candidate],
        evidence: &EvidenceBundle,
    ) -> Subgraph {
        let mut graph = Subgraph::new();

        let local_id = local_node.as_ref().map(|n| n.id.clone());
        if let Some(local) = local_node {
            graph.add_node(local);
        }

        let ranked = &candidates[..candidates.len().min(self.config.max_candidates)];
        for candidate in ranked {
            graph.add_node(Node::new(
                candidate.event.id.clone(),
                NodeKind::Global,
                EventAttributes {
                    name: candidate.event.name.clone(),
                    date: candidate.event.date,
                    location: candidate.event.location.clone(),
                    description: candidate.event.description.clone(),
                    keywords: candidate.event.keywords.clone(),
                    ..Default::default()
                },
            ));
        }

        let intermediates = self.intermediate_nodes(ranked, evidence);
        let intermediate_ids: Vec<String> = intermediates
            .iter()
            .map(|node| node.id.clone())
            .collect();
        for node in intermediates {
            graph.add_node(node);
        }

        let mut edge_counter = 0usize;
        if let Some(local_id) = &local_id {
            for candidate in ranked {
                let edge = self.causal_edge(candidate, local_id, &graph, &mut edge_counter);
                graph.add_edge(edge);
            }

            for inter_id in intermediate_ids.iter().take(self.config.max_entities) {
                for candidate in ranked.iter().take(self.config.max_bridged_candidates) {
                    let mut edge = Edge::new(
                        next_edge_id(&mut edge_counter),
                        candidate.event.id.clone(),
                        inter_id.clone(),
                        EdgeType::Mentions,
                        self.config.mention_weight,
                    );
                    edge.source_count = 1.0;
                    graph.add_edge(edge);
                }

                let mut edge = Edge::new(
                    next_edge_id(&mut edge_counter),
                    inter_id.clone(),
                    local_id.clone(),
                    EdgeType::RelatedTo,
                    self.config.relation_weight,
                );
                edge.source_count = 1.0;
                graph.add_edge(edge);
            }
        }

        graph
    }

    /// The causal-candidate edge from a global candidate onto the local node.
    ///
    /// Weight blends the candidate's scores, gets a temporal boost, and is
    /// raised to any named-event floor; directness and source counts are
    /// derived from the final weight.
    fn causal_edge(
        &self,
        candidate: &Candidate,
        local_id: &str,
        graph: &Subgraph,
        edge_counter: &mut usize,
    ) -> Edge {
        let mut weight = candidate
            .relevance_score
            .max(candidate.similarity_score)
            .max(candidate.keyword_match * 0.8);
        if candidate.temporal_relevance > 0.7 {
            weight = (weight * 1.2).min(1.0);
        }
        if let Some(floor) = self.overrides.weight_floor(&candidate.event.name) {
            weight = weight.max(floor);
        }
        weight = weight.min(1.0);

        let mut edge = Edge::new(
            next_edge_id(edge_counter),
            candidate.event.id.clone(),
            local_id.to_string(),
            EdgeType::CausalCandidate,
            weight,
        );
        edge.directness_score = if weight > 0.7 { 0.9 } else { 0.7 };
        edge.source_count = if weight > 0.7 { 3.0 } else { 2.0 };
        edge.max_sources_required = 5.0;
        edge.temporal_gap_days = temporal_gap_days(
            candidate.event.date,
            graph.node(local_id).and_then(|n| n.attributes.date),
        );
        edge.metadata.insert(
            "similarity_score".into(),
            Value::Float(candidate.similarity_score as f64),
        );
        edge.metadata.insert(
            "keyword_match".into(),
            Value::Float(candidate.keyword_match as f64),
        );
        edge.metadata.insert(
            "temporal_relevance".into(),
            Value::Float(candidate.temporal_relevance as f64),
        );
        edge
    }

    /// Synthesizes intermediate bridge nodes from evidence and candidates.
    ///
    /// Commodities come from scanning evidence text against the vocabulary
    /// (sorted for deterministic ids); entities are the distinct candidate
    /// locations, capped.
    fn intermediate_nodes(&self, candidates: &[Candidate], evidence: &EvidenceBundle) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut counter = 0usize;

        let mut commodities: BTreeSet<&str> = BTreeSet::new();
        for snippet in &evidence.raw_text_evidence {
            let text = snippet.extract.to_lowercase();
            for commodity in &self.commodity_vocabulary {
                if text.contains(commodity.as_str()) {
                    commodities.insert(commodity);
                }
            }
        }
        for commodity in commodities {
            let name = capitalize(commodity);
            nodes.push(intermediate_node(
                format!("INTER_COMMODITY_{counter}"),
                name.clone(),
                "commodity",
                format!("{name} as a traded commodity"),
            ));
            counter += 1;
        }

        let mut locations: Vec<&str> = Vec::new();
        for candidate in candidates {
            let location = candidate.event.location.as_str();
            if !location.is_empty() && !locations.contains(&location) {
                locations.push(location);
            }
        }
        for location in locations.into_iter().take(self.config.max_entities) {
            nodes.push(intermediate_node(
                format!("INTER_ENTITY_{counter}"),
                location.to_string(),
                "entity",
                format!("{location} as a geopolitical entity"),
            ));
            counter += 1;
        }

        nodes
    }
}

fn intermediate_node(id: String, name: String, category: &str, description: String) -> Node {
    Node::new(
        id,
        NodeKind::Intermediate,
        EventAttributes {
            name,
            description,
            category: Some(category.to_string()),
            ..Default::default()
        },
    )
}

fn next_edge_id(counter: &mut usize) -> String {
    let id = format!("EDGE_{counter}");
    *counter += 1;
    id
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
