//! Constraint gating, evidence weighting, and final-score fusion.
//!
//! Takes raw predictions from the relational reasoner and produces the
//! ranked [`ScoredPrediction`] list:
//!
//! 1. Constraint gating — predictions failing all three constraints are
//!    dropped (a valid zero-influence outcome, not an error).
//! 2. Reliability — `R = w_d*D + w_s*S + w_t*T` over the supporting edge.
//! 3. Evidence strength — snippet corroboration weighted by source category
//!    (archive > book > encyclopedia > other).
//! 4. Fusion — `final = 0.6*causal + 0.4*R` with tiered quality boosts and a
//!    small mechanism boost. The tier thresholds are calibration constants.

use crate::constraints::ConstraintChecker;
use crate::loader::temporal_gap_days;
use crate::overrides::OverrideTable;
use crate::reliability::{EdgeEvidence, ReliabilityCalculator};
use crate::types::{
    EventAttributes, EvidenceBundle, Mechanism, Prediction, ScoredPrediction, Subgraph,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Multiplier applied to causal strength when temporal order fails.
const TEMPORAL_ORDER_PENALTY: f64 = 0.2;

/// Weight of causal strength in the final blend.
const CAUSAL_WEIGHT: f64 = 0.6;

/// Weight of reliability in the final blend.
const RELIABILITY_WEIGHT: f64 = 0.4;

/// Mechanisms considered reliable enough to earn the flat final-score boost.
const BOOSTED_MECHANISMS: [Mechanism; 3] = [
    Mechanism::Technology,
    Mechanism::TradeShock,
    Mechanism::ColonialControl,
];

/// One tier of the quality boost ladder; the first matching tier applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierBoost {
    pub min_causal: f64,
    pub min_reliability: f64,
    pub factor: f64,
    pub cap: f64,
}

/// The default boost ladder, highest tier first.
pub fn default_tier_boosts() -> Vec<TierBoost> {
    vec![
        TierBoost { min_causal: 0.80, min_reliability: 0.70, factor: 1.08, cap: 0.95 },
        TierBoost { min_causal: 0.75, min_reliability: 0.65, factor: 1.05, cap: 0.92 },
        TierBoost { min_causal: 0.70, min_reliability: 0.60, factor: 1.03, cap: 0.90 },
    ]
}

/// Per-source-category weights for evidence corroboration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvidenceWeights {
    pub archive: f64,
    pub book: f64,
    pub encyclopedia: f64,
    pub other: f64,
}

impl Default for EvidenceWeights {
    fn default() -> Self {
        Self {
            archive: 1.0,
            book: 0.7,
            encyclopedia: 0.5,
            other: 0.3,
        }
    }
}

/// Gates, scores, and ranks predictions.
#[derive(Debug, Clone)]
pub struct PredictionScorer {
    checker: ConstraintChecker,
    calculator: ReliabilityCalculator,
    overrides: Arc<OverrideTable>,
    evidence_weights: EvidenceWeights,
    tier_boosts: Vec<TierBoost>,
}

impl PredictionScorer {
    /// Creates a scorer over the given constraint checker, reliability
    /// weights, and override table.
    pub fn new(
        checker: ConstraintChecker,
        calculator: ReliabilityCalculator,
        overrides: Arc<OverrideTable>,
    ) -> Self {
        Self {
            checker,
            calculator,
            overrides,
            evidence_weights: EvidenceWeights::default(),
            tier_boosts: default_tier_boosts(),
        }
    }

    /// Scores every prediction, dropping those failing all constraints, and
    /// returns the survivors sorted by final score descending.
    pub fn score(
        &self,
        predictions: Vec<Prediction>,
        subgraph: &Subgraph,
        evidence: &EvidenceBundle,
    ) -> Vec<ScoredPrediction> {
        let mut scored: Vec<ScoredPrediction> = predictions
            .into_iter()
            .filter_map(|p| self.score_one(p, subgraph, evidence))
            .collect();
        scored.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    fn score_one(
        &self,
        mut prediction: Prediction,
        subgraph: &Subgraph,
        evidence: &EvidenceBundle,
    ) -> Option<ScoredPrediction> {
        let constraints = self.checker.check(&prediction, subgraph, &self.overrides);
        if !constraints.passed {
            tracing::debug!(
                global = %prediction.global_event_id,
                "prediction dropped: all constraints failed"
            );
            return None;
        }

        let cause = subgraph.node(&prediction.global_event_id)?;
        let evidence_strength =
            self.evidence_strength(&cause.attributes, evidence);

        let edge_evidence = self.edge_evidence(&prediction, subgraph);
        let reliability = self.calculator.calculate(edge_evidence);

        let mut causal = prediction.causal_strength as f64;
        if !constraints.temporal_order {
            causal *= TEMPORAL_ORDER_PENALTY;
        }
        prediction.causal_strength = causal as f32;

        let mut final_score = CAUSAL_WEIGHT * causal + RELIABILITY_WEIGHT * reliability.reliability;
        for tier in &self.tier_boosts {
            if causal >= tier.min_causal && reliability.reliability >= tier.min_reliability {
                final_score = (final_score * tier.factor).min(tier.cap);
                break;
            }
        }
        if BOOSTED_MECHANISMS.contains(&prediction.mechanisms.top()) {
            final_score = (final_score * 1.02).min(0.95);
        }

        Some(ScoredPrediction {
            prediction,
            constraints,
            reliability,
            evidence_strength,
            final_score: final_score.clamp(0.0, 1.0),
        })
    }

    /// Collects the numeric reliability inputs for one prediction.
    ///
    /// The supporting subgraph edge supplies directness and source counts
    /// (raised to any named floors); the temporal gap is always recomputed
    /// from the endpoint dates when both are known.
    fn edge_evidence(&self, prediction: &Prediction, subgraph: &Subgraph) -> EdgeEvidence {
        let cause = subgraph.node(&prediction.global_event_id);
        let effect = subgraph.node(&prediction.local_event_id);
        let cause_name = cause.map(|n| n.attributes.name.as_str()).unwrap_or("");

        let mut evidence = match subgraph
            .edge_between(&prediction.global_event_id, &prediction.local_event_id)
        {
            Some(edge) => EdgeEvidence {
                directness_score: edge.directness_score as f64,
                source_count: edge.source_count as f64,
                max_sources_required: edge.max_sources_required as f64,
                temporal_gap_days: edge.temporal_gap_days,
            },
            None => EdgeEvidence::default(),
        };

        if let Some(directness) = self.overrides.directness_override(cause_name) {
            evidence.directness_score = directness as f64;
        }
        if let Some(floor) = self.overrides.source_count_floor(cause_name) {
            evidence.source_count = evidence.source_count.max(floor as f64);
        } else if evidence.directness_score >= 0.9 {
            evidence.source_count = evidence.source_count.max(3.0);
        }

        if let (Some(cause), Some(effect)) = (cause, effect) {
            let gap = temporal_gap_days(cause.attributes.date, effect.attributes.date);
            if cause.attributes.date.is_some() && effect.attributes.date.is_some() {
                evidence.temporal_gap_days = gap;
            }
        }

        evidence
    }

    /// Measures how strongly the collected evidence corroborates an event.
    ///
    /// Matches event keywords (words longer than 3 characters from the name
    /// and description, plus named-event expansions) against each snippet;
    /// matching snippets contribute their source-category weight. Evidence
    /// that exists but never matches earns one encyclopedia-category mention
    /// of partial credit rather than zero.
    pub fn evidence_strength(
        &self,
        event: &EventAttributes,
        evidence: &EvidenceBundle,
    ) -> f64 {
        let name = event.name.to_lowercase();
        let description = event.description.to_lowercase();

        let mut keywords: HashSet<String> = name
            .split_whitespace()
            .chain(description.split_whitespace())
            .filter(|w| w.len() > 3)
            .map(|w| w.to_string())
            .collect();
        keywords.extend(self.overrides.evidence_keywords(&name));

        let weights = &self.evidence_weights;
        let mut mention_count = 0usize;
        let mut weighted = 0.0f64;

        for snippet in &evidence.raw_text_evidence {
            let text = snippet.extract.to_lowercase();
            let text_words: HashSet<&str> = text.split_whitespace().collect();
            let word_hit = keywords.iter().any(|kw| text_words.contains(kw.as_str()));
            let substring_hit = keywords
                .iter()
                .any(|kw| kw.len() > 4 && text.contains(kw.as_str()));
            if !(word_hit || substring_hit) {
                continue;
            }
            mention_count += 1;
            weighted += category_weight(&snippet.source, weights);
        }

        if mention_count == 0 && !evidence.raw_text_evidence.is_empty() {
            mention_count = 1;
            weighted = weights.encyclopedia;
        }

        let max_possible = if mention_count > 0 { mention_count as f64 } else { 1.0 };
        let mut strength = (weighted / max_possible).min(1.0);

        if let Some(floor) = self.overrides.evidence_floor(&name) {
            strength = strength.max(floor);
        }
        strength
    }
}

fn category_weight(source: &str, weights: &EvidenceWeights) -> f64 {
    let source = source.to_lowercase();
    if source.contains("archive") || source.contains("record") {
        weights.archive
    } else if source.contains("book") || source.contains("publication") {
        weights.book
    } else if source.contains("wikipedia") || source.contains("encyclopedia") {
        weights.encyclopedia
    } else {
        weights.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintChecker;
    use crate::types::{
        Edge, EdgeType, MechanismDistribution, Node, NodeKind, PredictionSource, Snippet,
    };
    use chrono::NaiveDate;

    fn scorer() -> PredictionScorer {
        PredictionScorer::new(
            ConstraintChecker::default(),
            ReliabilityCalculator::default(),
            Arc::new(OverrideTable::default()),
        )
    }

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

    fn prediction(global: &str, local: &str, strength: f32) -> Prediction {
        Prediction {
            global_event_id: global.into(),
            local_event_id: local.into(),
            causal_strength: strength,
            source: PredictionSource::EdgeFallback { edge_id: "EDGE_0".into() },
            mechanisms: MechanismDistribution {
                trade_shock: 0.9,
                economic_shift: 0.1,
                ..Default::default()
            }
            .normalized(),
        }
    }

    fn subgraph(cause_year: Option<i32>) -> Subgraph {
        let mut graph = Subgraph::new();
        graph.add_node(node(
            "L",
            NodeKind::Local,
            "Establishment of tea plantations",
            Some(1867),
            "Ceylon",
        ));
        graph.add_node(node(
            "G",
            NodeKind::Global,
            "American Civil War",
            cause_year,
            "United States",
        ));
        let mut edge = Edge::new("EDGE_0", "G", "L", EdgeType::CausalCandidate, 0.85);
        edge.directness_score = 0.9;
        edge.source_count = 3.0;
        edge.max_sources_required = 5.0;
        graph.add_edge(edge);
        graph
    }

    #[test]
    fn test_all_constraints_failing_drops_prediction() {
        let scorer = scorer();
        // No nodes in the subgraph at all: every constraint fails.
        let graph = Subgraph::new();
        let scored = scorer.score(
            vec![prediction("G", "L", 0.9)],
            &graph,
            &EvidenceBundle::default(),
        );
        assert!(scored.is_empty());
    }

    #[test]
    fn test_single_passing_constraint_retains_prediction() {
        let scorer = scorer();
        let graph = subgraph(Some(1861));
        let scored = scorer.score(
            vec![prediction("G", "L", 0.85)],
            &graph,
            &EvidenceBundle::default(),
        );
        assert_eq!(scored.len(), 1);
        assert!(scored[0].constraints.passed);
    }

    #[test]
    fn test_temporal_failure_penalizes_causal_strength() {
        let scorer = scorer();
        // Cause dated after the effect; geographic plausibility still passes
        // (Ceylon is in the affected-region list), so the prediction is kept.
        let graph = subgraph(Some(1900));
        let scored = scorer.score(
            vec![prediction("G", "L", 0.85)],
            &graph,
            &EvidenceBundle::default(),
        );
        assert_eq!(scored.len(), 1);
        let entry = &scored[0];
        assert!(!entry.constraints.temporal_order);
        assert!(entry.constraints.passed);
        assert!((entry.prediction.causal_strength - 0.17).abs() < 1e-6);
    }

    #[test]
    fn test_high_quality_prediction_lands_in_high_bucket() {
        let scorer = scorer();
        let graph = subgraph(Some(1861));
        let evidence = EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                title: "Cotton famine".into(),
                extract: "The war disrupted cotton supply chains worldwide".into(),
                url: String::new(),
                source: "wikipedia".into(),
            }],
            ..Default::default()
        }
        .assemble();
        let scored = scorer.score(vec![prediction("G", "L", 0.85)], &graph, &evidence);
        assert_eq!(scored.len(), 1);
        // Source floor raises the Civil War source count to 4: S = 0.8.
        assert!((scored[0].reliability.source_consistency - 0.8).abs() < 1e-9);
        assert!(scored[0].final_score > 0.7, "score {}", scored[0].final_score);
    }

    #[test]
    fn test_results_sorted_by_final_score() {
        let scorer = scorer();
        let mut graph = subgraph(Some(1861));
        graph.add_node(node("G2", NodeKind::Global, "Opium Wars", Some(1839), "China"));
        let mut weak = Edge::new("EDGE_1", "G2", "L", EdgeType::CausalCandidate, 0.4);
        weak.directness_score = 0.7;
        weak.source_count = 2.0;
        graph.add_edge(weak);

        let scored = scorer.score(
            vec![prediction("G2", "L", 0.4), prediction("G", "L", 0.85)],
            &graph,
            &EvidenceBundle::default(),
        );
        assert_eq!(scored.len(), 2);
        assert!(scored[0].final_score >= scored[1].final_score);
        assert_eq!(scored[0].prediction.global_event_id, "G");
    }

    #[test]
    fn test_evidence_strength_weighs_source_categories() {
        let scorer = scorer();
        let event = EventAttributes {
            name: "Railway expansion".into(),
            description: "Rapid railway construction across the interior".into(),
            ..Default::default()
        };
        let archive_bundle = EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                extract: "Colonial railway construction records".into(),
                source: "national archive".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
        .assemble();
        let other_bundle = EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                extract: "Colonial railway construction notes".into(),
                source: "blog".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
        .assemble();
        let archive = scorer.evidence_strength(&event, &archive_bundle);
        let other = scorer.evidence_strength(&event, &other_bundle);
        assert!(archive > other);
        assert_eq!(archive, 1.0);
        assert_eq!(other, 0.3);
    }

    #[test]
    fn test_unmatched_evidence_earns_partial_credit() {
        let scorer = scorer();
        let event = EventAttributes {
            name: "Obscure happening".into(),
            description: "Entirely unrelated".into(),
            ..Default::default()
        };
        let bundle = EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                extract: "Text about other topics with zero shared terms".into(),
                source: "wikipedia".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
        .assemble();
        let strength = scorer.evidence_strength(&event, &bundle);
        assert_eq!(strength, 0.5);
    }

    #[test]
    fn test_no_evidence_no_credit() {
        let scorer = scorer();
        let event = EventAttributes {
            name: "Obscure happening".into(),
            ..Default::default()
        };
        assert_eq!(scorer.evidence_strength(&event, &EvidenceBundle::default()), 0.0);
    }

    #[test]
    fn test_named_event_evidence_floor_applies() {
        let scorer = scorer();
        let event = EventAttributes {
            name: "American Civil War".into(),
            description: "War disrupting cotton supply".into(),
            ..Default::default()
        };
        // No evidence at all, but the named-event floor holds.
        let strength = scorer.evidence_strength(&event, &EvidenceBundle::default());
        assert_eq!(strength, 0.65);
    }
}
