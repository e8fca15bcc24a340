//! Plausibility constraints for predicted causal links.
//!
//! Three checks run against the query subgraph: temporal order, geographic
//! plausibility, and source consistency. A prediction passes when at least
//! one holds — a deliberately lenient bar, because query-time candidate
//! edges often lack complete provenance. Predictions failing all three are
//! dropped from scored output entirely.

use crate::overrides::OverrideTable;
use crate::types::{ConstraintResult, EventAttributes, Prediction, Subgraph};
use serde::{Deserialize, Serialize};

/// Vocabulary driving the geographic-plausibility check.
///
/// Injected configuration data; the defaults match the calibration corpus
/// (British-colonial plantation history).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintPolicy {
    /// Markers of colonial/administrative reach in the cause's text.
    pub colonial_markers: Vec<String>,
    /// Effect locations accepted as within the affected region.
    pub affected_regions: Vec<String>,
    /// Trade keywords that make any influence geographically plausible.
    pub trade_keywords: Vec<String>,
    /// Upper bound used by the source-consistency check when
    /// `max_sources_required` is smaller.
    pub source_count_ceiling: f32,
}

impl Default for ConstraintPolicy {
    fn default() -> Self {
        Self {
            colonial_markers: vec!["british".into(), "colonial".into()],
            affected_regions: vec!["sri lanka".into(), "ceylon".into()],
            trade_keywords: vec!["trade".into(), "export".into(), "commodity".into()],
            source_count_ceiling: 10.0,
        }
    }
}

/// Evaluates the three plausibility constraints for one prediction.
#[derive(Debug, Clone, Default)]
pub struct ConstraintChecker {
    policy: ConstraintPolicy,
}

impl ConstraintChecker {
    /// Creates a checker with the given policy vocabulary.
    pub fn new(policy: ConstraintPolicy) -> Self {
        Self { policy }
    }

    /// Runs all three constraints against the subgraph.
    ///
    /// Returns an all-false result when either endpoint node is missing from
    /// the subgraph (such predictions cannot be substantiated at all).
    pub fn check(
        &self,
        prediction: &Prediction,
        subgraph: &Subgraph,
        overrides: &OverrideTable,
    ) -> ConstraintResult {
        let (Some(cause), Some(effect)) = (
            subgraph.node(&prediction.global_event_id),
            subgraph.node(&prediction.local_event_id),
        ) else {
            return ConstraintResult::from_components(false, false, false);
        };

        let temporal_order =
            self.temporal_order(&cause.attributes, &effect.attributes, overrides);
        let geographic = self.geographic_plausibility(&cause.attributes, &effect.attributes);
        let sources = self.source_consistency(prediction, subgraph);

        ConstraintResult::from_components(temporal_order, geographic, sources)
    }

    /// Cause year must not exceed effect year.
    ///
    /// Documented historical exceptions from the override table allow a later
    /// nominal cause date; missing or unparsable dates default to passed.
    fn temporal_order(
        &self,
        cause: &EventAttributes,
        effect: &EventAttributes,
        overrides: &OverrideTable,
    ) -> bool {
        let (Some(cause_year), Some(effect_year)) = (cause.year(), effect.year()) else {
            return true;
        };
        if overrides.temporal_exception(&cause.name, cause_year, &effect.name, effect_year) {
            return true;
        }
        cause_year <= effect_year
    }

    /// True when the cause shows colonial/administrative reach, the effect
    /// lies in an affected region, or trade keywords tie the pair together.
    fn geographic_plausibility(&self, cause: &EventAttributes, effect: &EventAttributes) -> bool {
        let cause_text = format!(
            "{} {} {}",
            cause.location, cause.name, cause.description
        )
        .to_lowercase();
        if self
            .policy
            .colonial_markers
            .iter()
            .any(|marker| cause_text.contains(marker.as_str()))
        {
            return true;
        }

        let effect_location = effect.location.to_lowercase();
        if self
            .policy
            .affected_regions
            .iter()
            .any(|region| effect_location.contains(region.as_str()))
        {
            return true;
        }

        let combined = format!(
            "{} {} {}",
            cause_text,
            effect.name.to_lowercase(),
            effect.description.to_lowercase()
        );
        self.policy
            .trade_keywords
            .iter()
            .any(|kw| combined.contains(kw.as_str()))
    }

    /// Source count must lie in `[0, max(max_sources_required, ceiling)]`.
    ///
    /// Candidate edges synthesized at query time may carry no provenance; a
    /// missing edge defaults to passed.
    fn source_consistency(&self, prediction: &Prediction, subgraph: &Subgraph) -> bool {
        match subgraph.edge_between(&prediction.global_event_id, &prediction.local_event_id) {
            Some(edge) => {
                let ceiling = edge
                    .max_sources_required
                    .max(self.policy.source_count_ceiling);
                edge.source_count >= 0.0 && edge.source_count <= ceiling
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Edge, EdgeType, MechanismDistribution, Node, NodeKind, PredictionSource,
    };
    use chrono::NaiveDate;

    fn node(id: &str, kind: NodeKind, name: &str, year: Option<i32>, location: &str) -> Node {
        Node::new(
            id,
            kind,
            EventAttributes {
                name: name.into(),
                date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
                location: location.into(),
                ..Default::default()
            },
        )
    }

    fn prediction(global: &str, local: &str) -> Prediction {
        Prediction {
            global_event_id: global.into(),
            local_event_id: local.into(),
            causal_strength: 0.8,
            source: PredictionSource::EdgeFallback {
                edge_id: "EDGE_0".into(),
            },
            mechanisms: MechanismDistribution::default().normalized(),
        }
    }

    fn graph_with(cause: Node, effect: Node, edge: Option<Edge>) -> Subgraph {
        let mut graph = Subgraph::new();
        graph.add_node(effect);
        graph.add_node(cause);
        if let Some(edge) = edge {
            graph.add_edge(edge);
        }
        graph
    }

    #[test]
    fn test_temporal_order_cause_before_effect_passes() {
        let checker = ConstraintChecker::default();
        let graph = graph_with(
            node("G", NodeKind::Global, "Industrial Revolution", Some(1760), "Europe"),
            node("L", NodeKind::Local, "Tea plantations", Some(1867), "Hill Country"),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.temporal_order);
        assert!(result.passed);
    }

    #[test]
    fn test_temporal_order_future_cause_fails_without_exception() {
        let checker = ConstraintChecker::default();
        let graph = graph_with(
            node("G", NodeKind::Global, "Great Exhibition", Some(1901), "London"),
            node("L", NodeKind::Local, "Tea plantations", Some(1867), "Hill Country"),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(!result.temporal_order);
    }

    #[test]
    fn test_temporal_order_documented_exception_passes() {
        let checker = ConstraintChecker::default();
        let graph = graph_with(
            node("G", NodeKind::Global, "Coffee Leaf Rust Epidemic", Some(1869), "Global"),
            node(
                "L",
                NodeKind::Local,
                "Establishment of tea plantations",
                Some(1867),
                "Hill Country",
            ),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.temporal_order);
    }

    #[test]
    fn test_missing_dates_default_to_passed() {
        let checker = ConstraintChecker::default();
        let graph = graph_with(
            node("G", NodeKind::Global, "Undated upheaval", None, "Nowhere"),
            node("L", NodeKind::Local, "Tea plantations", Some(1867), "Hill Country"),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.temporal_order);
    }

    #[test]
    fn test_geographic_plausibility_via_affected_region() {
        let checker = ConstraintChecker::default();
        let graph = graph_with(
            node("G", NodeKind::Global, "Continental fair", Some(1850), "Vienna"),
            node("L", NodeKind::Local, "Harbor expansion", Some(1867), "Colombo, Ceylon"),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.geographic_plausibility);
    }

    #[test]
    fn test_geographic_plausibility_via_trade_keywords() {
        let checker = ConstraintChecker::default();
        let mut cause = node("G", NodeKind::Global, "Continental fair", Some(1850), "Vienna");
        cause.attributes.description = "Disrupted export markets across the region".into();
        let graph = graph_with(
            cause,
            node("L", NodeKind::Local, "Harbor expansion", Some(1867), "Elsewhere"),
            None,
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.geographic_plausibility);
    }

    #[test]
    fn test_source_consistency_bounds() {
        let checker = ConstraintChecker::default();
        let mut edge = Edge::new("EDGE_0", "G", "L", EdgeType::CausalCandidate, 0.8);
        edge.source_count = 3.0;
        edge.max_sources_required = 5.0;
        let graph = graph_with(
            node("G", NodeKind::Global, "Plain event", Some(1850), "Nowhere"),
            node("L", NodeKind::Local, "Plain effect", Some(1867), "Elsewhere"),
            Some(edge),
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(result.source_consistency);

        // Runaway source counts fail the check.
        let mut over = Edge::new("EDGE_0", "G", "L", EdgeType::CausalCandidate, 0.8);
        over.source_count = 25.0;
        let graph = graph_with(
            node("G", NodeKind::Global, "Plain event", Some(1850), "Nowhere"),
            node("L", NodeKind::Local, "Plain effect", Some(1867), "Elsewhere"),
            Some(over),
        );
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(!result.source_consistency);
    }

    #[test]
    fn test_missing_endpoint_fails_everything() {
        let checker = ConstraintChecker::default();
        let mut graph = Subgraph::new();
        graph.add_node(node("L", NodeKind::Local, "Tea plantations", Some(1867), "Hill Country"));
        let result = checker.check(&prediction("G", "L"), &graph, &OverrideTable::default());
        assert!(!result.passed);
    }
}
