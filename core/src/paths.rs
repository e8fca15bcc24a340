//! Explanation-path search over the query subgraph.
//!
//! Enumerates simple directed paths from a candidate's global node to the
//! local node with breadth-first search bounded by depth, scores each path
//! from its edge weights, length, and the prediction's final score, and
//! renders the winners into curator-readable sentences.

use crate::types::{EdgeType, ExplanationPath, NodeId, NodeKind, ScoredPrediction, Subgraph};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration for the explanation path search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathSearchConfig {
    /// Maximum number of hops (edges) in a returned path.
    pub max_depth: usize,
    /// Maximum number of scored paths to return per prediction.
    pub max_paths: usize,
}

impl Default for PathSearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_paths: 3,
        }
    }
}

/// Weight of the mean edge weight in a path's score.
const EDGE_WEIGHT_SHARE: f64 = 0.4;
/// Weight of the inverse path length in a path's score.
const LENGTH_SHARE: f64 = 0.3;
/// Weight of the prediction's final score in a path's score.
const PREDICTION_SHARE: f64 = 0.3;

/// Edge weight assumed for a hop whose edge cannot be resolved.
const MISSING_EDGE_WEIGHT: f32 = 0.3;

/// Builds scored, rendered explanation paths for scored predictions.
#[derive(Debug, Clone, Default)]
pub struct PathConstructor {
    config: PathSearchConfig,
}

impl PathConstructor {
    /// Creates a constructor with the given search bounds.
    pub fn new(config: PathSearchConfig) -> Self {
        Self { config }
    }

    /// Enumerates, scores, and renders paths for one scored prediction.
    ///
    /// Every returned path is simple (no repeated node ids), at most
    /// `max_depth` hops long, and made of real subgraph edges.
    pub fn construct(
        &self,
        prediction: &ScoredPrediction,
        subgraph: &Subgraph,
    ) -> Vec<ExplanationPath> {
        let source = &prediction.prediction.global_event_id;
        let target = &prediction.prediction.local_event_id;

        let raw_paths = self.enumerate_paths(subgraph, source, target);

        let mut scored: Vec<ExplanationPath> = raw_paths
            .into_iter()
            .take(self.config.max_paths * 2)
            .map(|nodes| self.score_path(nodes, subgraph, prediction.final_score))
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(self.config.max_paths);
        scored
    }

    /// BFS enumeration of simple directed paths from `source` to `target`.
    fn enumerate_paths(&self, subgraph: &Subgraph, source: &str, target: &str) -> Vec<Vec<NodeId>> {
        if !subgraph.contains(source) || !subgraph.contains(target) {
            return Vec::new();
        }

        let mut paths = Vec::new();
        let mut queue: VecDeque<Vec<NodeId>> = VecDeque::new();
        queue.push_back(vec![source.to_string()]);

        while let Some(path) = queue.pop_front() {
            let current = path.last().expect("paths are never empty");

            if current == target && path.len() > 1 {
                paths.push(path);
                continue;
            }
            if path.len() > self.config.max_depth {
                continue;
            }

            for neighbor in subgraph.out_neighbors(current) {
                if path.iter().any(|id| id == neighbor) {
                    continue;
                }
                let mut next = path.clone();
                next.push(neighbor.to_string());
                queue.push_back(next);
            }
        }

        paths
    }

    fn score_path(
        &self,
        nodes: Vec<NodeId>,
        subgraph: &Subgraph,
        final_score: f64,
    ) -> ExplanationPath {
        let mut edge_weights = Vec::with_capacity(nodes.len().saturating_sub(1));
        for hop in nodes.windows(2) {
            let weight = subgraph
                .edge_between(&hop[0], &hop[1])
                .map(|e| e.weight)
                .unwrap_or(MISSING_EDGE_WEIGHT);
            edge_weights.push(weight);
        }

        let mean_weight = if edge_weights.is_empty() {
            0.0
        } else {
            edge_weights.iter().map(|&w| w as f64).sum::<f64>() / edge_weights.len() as f64
        };
        let length_score = 1.0 / nodes.len() as f64;
        let score = EDGE_WEIGHT_SHARE * mean_weight
            + LENGTH_SHARE * length_score
            + PREDICTION_SHARE * final_score;

        let explanation = self.render(&nodes, subgraph);

        ExplanationPath {
            nodes,
            edge_weights,
            score,
            explanation,
        }
    }

    /// Renders a path into a curator-readable sentence.
    ///
    /// Causal-candidate hops read as direct influence; hops into an
    /// intermediate name its category; anything else falls back to an arrow.
    fn render(&self, nodes: &[NodeId], subgraph: &Subgraph) -> String {
        if nodes.len() < 2 {
            return "Direct connection".to_string();
        }

        let mut fragments = Vec::with_capacity(nodes.len() - 1);
        for hop in nodes.windows(2) {
            let source = subgraph.node(&hop[0]);
            let target = subgraph.node(&hop[1]);
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };

            let source_name = display_name(source);
            let target_name = display_name(target);
            let edge = subgraph.edge_between(&hop[0], &hop[1]);

            let fragment = match (edge.map(|e| e.edge_type), target.kind) {
                (Some(EdgeType::CausalCandidate), _) => {
                    format!("{source_name} directly influenced {target_name}")
                }
                (_, NodeKind::Intermediate) => {
                    let category = target
                        .attributes
                        .category
                        .as_deref()
                        .unwrap_or("entity");
                    format!("{source_name} affected {target_name} ({category})")
                }
                _ => format!("{source_name} -> {target_name}"),
            };
            fragments.push(fragment);
        }

        if fragments.is_empty() {
            return "Path found".to_string();
        }
        fragments.join(" -> ")
    }
}

fn display_name(node: &crate::types::Node) -> &str {
    if node.attributes.name.is_empty() {
        &node.id
    } else {
        &node.attributes.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ConstraintResult, Edge, EventAttributes, MechanismDistribution, Node, Prediction,
        PredictionSource, ReliabilityScore,
    };
    use std::collections::HashSet;

    fn node(id: &str, kind: NodeKind, name: &str) -> Node {
        Node::new(
            id,
            kind,
            EventAttributes {
                name: name.into(),
                ..Default::default()
            },
        )
    }

    fn intermediate(id: &str, name: &str, category: &str) -> Node {
        Node::new(
            id,
            NodeKind::Intermediate,
            EventAttributes {
                name: name.into(),
                category: Some(category.into()),
                ..Default::default()
            },
        )
    }

    fn scored(global: &str, local: &str, final_score: f64) -> ScoredPrediction {
        ScoredPrediction {
            prediction: Prediction {
                global_event_id: global.into(),
                local_event_id: local.into(),
                causal_strength: 0.8,
                source: PredictionSource::EdgeFallback { edge_id: "EDGE_0".into() },
                mechanisms: MechanismDistribution::default().normalized(),
            },
            constraints: ConstraintResult::from_components(true, true, true),
            reliability: ReliabilityScore {
                directness: 0.9,
                source_consistency: 0.6,
                temporal_proximity: 1.0,
                reliability: 0.84,
            },
            evidence_strength: 0.5,
            final_score,
        }
    }

    /// Diamond: G -> L directly, and G -> I -> L through a commodity.
    fn diamond() -> Subgraph {
        let mut graph = Subgraph::new();
        graph.add_node(node("L", NodeKind::Local, "Tea plantations"));
        graph.add_node(node("G", NodeKind::Global, "American Civil War"));
        graph.add_node(intermediate("I", "Cotton", "commodity"));
        graph.add_edge(Edge::new("EDGE_0", "G", "L", EdgeType::CausalCandidate, 0.85));
        graph.add_edge(Edge::new("EDGE_1", "G", "I", EdgeType::Mentions, 0.5));
        graph.add_edge(Edge::new("EDGE_2", "I", "L", EdgeType::RelatedTo, 0.6));
        graph
    }

    #[test]
    fn test_finds_direct_and_bridged_paths() {
        let constructor = PathConstructor::default();
        let paths = constructor.construct(&scored("G", "L", 0.8), &diamond());
        assert_eq!(paths.len(), 2);
        let node_lists: Vec<_> = paths.iter().map(|p| p.nodes.clone()).collect();
        assert!(node_lists.contains(&vec!["G".to_string(), "L".to_string()]));
        assert!(node_lists.contains(&vec!["G".to_string(), "I".to_string(), "L".to_string()]));
    }

    #[test]
    fn test_paths_are_simple_and_bounded() {
        let constructor = PathConstructor::new(PathSearchConfig {
            max_depth: 4,
            max_paths: 10,
        });
        let paths = constructor.construct(&scored("G", "L", 0.8), &diamond());
        for path in &paths {
            let unique: HashSet<_> = path.nodes.iter().collect();
            assert_eq!(unique.len(), path.nodes.len(), "repeated node in {:?}", path.nodes);
            assert!(path.hop_count() <= 4);
            // Every hop is a real subgraph edge.
            let graph = diamond();
            for hop in path.nodes.windows(2) {
                assert!(graph.edge_between(&hop[0], &hop[1]).is_some());
            }
        }
    }

    #[test]
    fn test_direct_path_outranks_longer_path() {
        let constructor = PathConstructor::default();
        let paths = constructor.construct(&scored("G", "L", 0.8), &diamond());
        // Direct hop: mean weight 0.85, length 2. Bridge: mean 0.55, length 3.
        assert_eq!(paths[0].nodes, vec!["G".to_string(), "L".to_string()]);
        assert!(paths[0].score > paths[1].score);
    }

    #[test]
    fn test_path_score_formula() {
        let constructor = PathConstructor::default();
        let paths = constructor.construct(&scored("G", "L", 0.8), &diamond());
        let direct = &paths[0];
        let expected = 0.4 * 0.85 + 0.3 * (1.0 / 2.0) + 0.3 * 0.8;
        assert!((direct.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rendering_names_influence_and_category() {
        let constructor = PathConstructor::default();
        let paths = constructor.construct(&scored("G", "L", 0.8), &diamond());
        let direct = paths
            .iter()
            .find(|p| p.nodes.len() == 2)
            .expect("direct path");
        assert_eq!(
            direct.explanation,
            "American Civil War directly influenced Tea plantations"
        );
        let bridged = paths
            .iter()
            .find(|p| p.nodes.len() == 3)
            .expect("bridged path");
        assert!(bridged.explanation.contains("affected Cotton (commodity)"));
        assert!(bridged.explanation.contains(" -> "));
    }

    #[test]
    fn test_depth_limit_prunes_long_chains() {
        let mut graph = Subgraph::new();
        for i in 0..7 {
            graph.add_node(node(&format!("N{i}"), NodeKind::Intermediate, &format!("Node {i}")));
        }
        for i in 0..6 {
            graph.add_edge(Edge::new(
                format!("EDGE_{i}"),
                format!("N{i}"),
                format!("N{}", i + 1),
                EdgeType::RelatedTo,
                0.6,
            ));
        }
        let constructor = PathConstructor::new(PathSearchConfig {
            max_depth: 4,
            max_paths: 3,
        });
        let prediction = scored("N0", "N6", 0.5);
        // Six hops exceeds the depth bound.
        assert!(constructor.construct(&prediction, &graph).is_empty());

        let shorter = scored("N2", "N6", 0.5);
        assert_eq!(constructor.construct(&shorter, &graph).len(), 1);
    }

    #[test]
    fn test_missing_endpoints_yield_no_paths() {
        let constructor = PathConstructor::default();
        let graph = diamond();
        assert!(constructor.construct(&scored("MISSING", "L", 0.5), &graph).is_empty());
    }
}
