//! Curator-facing result packaging.
//!
//! Assembles ranked influences, scores, constraint outcomes, and explanation
//! paths into the [`Report`] structure consumed as structured data or
//! rendered to plain text by the pipeline crate.

use crate::types::{
    ConstraintResult, EventAttributes, EvidenceBundle, ExplanationPath, Mechanism,
    MechanismDistribution, NodeId, PredictionSource, ScoredPrediction, Subgraph,
};
use serde::{Deserialize, Serialize};

/// Final-score threshold for the high-confidence bucket (exclusive).
pub const HIGH_CONFIDENCE: f64 = 0.7;
/// Final-score threshold for the medium-confidence bucket (inclusive lower bound).
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Maximum number of influences carried in a report.
pub const MAX_INFLUENCES: usize = 10;

/// Summary of the local event under examination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalEventSummary {
    pub id: NodeId,
    pub name: String,
    pub exhibit_name: Option<String>,
    pub date: Option<String>,
    pub location: String,
    pub description: String,
}

/// Summary of a candidate global event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalEventSummary {
    pub id: NodeId,
    pub name: String,
    pub date: Option<String>,
    pub location: String,
    pub description: String,
}

/// Counts of collected evidence per channel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EvidenceSummary {
    pub total_snippets: usize,
    pub wikipedia_snippets: usize,
    pub entity_mentions: usize,
    pub commodities: usize,
}

impl EvidenceSummary {
    /// Summarizes an evidence bundle.
    pub fn from_bundle(evidence: &EvidenceBundle) -> Self {
        Self {
            total_snippets: evidence.raw_text_evidence.len(),
            wikipedia_snippets: evidence.wikipedia_snippets.len(),
            entity_mentions: evidence.entity_mentions.len(),
            commodities: evidence.related_commodities.len(),
        }
    }
}

/// Discovery statistics bucketed by final score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DiscoveryStatistics {
    pub total_candidates: usize,
    /// Final score > 0.7.
    pub high_confidence: usize,
    /// Final score in [0.5, 0.7].
    pub medium_confidence: usize,
    /// Final score < 0.5.
    pub low_confidence: usize,
}

impl DiscoveryStatistics {
    /// Buckets the scored predictions.
    pub fn from_scored(scored: &[ScoredPrediction]) -> Self {
        Self {
            total_candidates: scored.len(),
            high_confidence: scored.iter().filter(|p| p.final_score > HIGH_CONFIDENCE).count(),
            medium_confidence: scored
                .iter()
                .filter(|p| {
                    p.final_score >= MEDIUM_CONFIDENCE && p.final_score <= HIGH_CONFIDENCE
                })
                .count(),
            low_confidence: scored
                .iter()
                .filter(|p| p.final_score < MEDIUM_CONFIDENCE)
                .count(),
        }
    }
}

/// The reliability components surfaced to the curator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReliabilityComponents {
    pub directness: f64,
    pub source_consistency: f64,
    pub temporal_proximity: f64,
}

/// One ranked influence in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Influence {
    pub global_event: GlobalEventSummary,
    pub causal_strength: f32,
    /// Reliability on the 0-100 display scale.
    pub reliability_score: f64,
    pub final_score: f64,
    /// Label of the most probable mechanism.
    pub mechanism: String,
    pub mechanism_probs: MechanismDistribution,
    pub constraints: ConstraintResult,
    pub evidence_strength: f64,
    pub reliability_components: ReliabilityComponents,
    /// Provenance of the causal-strength score.
    pub prediction_source: PredictionSource,
    pub explanation_paths: Vec<ExplanationPath>,
}

impl Influence {
    /// The top mechanism as a typed value.
    pub fn top_mechanism(&self) -> Mechanism {
        self.mechanism_probs.top()
    }
}

/// The packaged result for one curator query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub local_event: LocalEventSummary,
    pub evidence_summary: EvidenceSummary,
    pub statistics: DiscoveryStatistics,
    pub top_influences: Vec<Influence>,
}

/// Assembles reports from scored predictions and their explanation paths.
#[derive(Debug, Clone, Default)]
pub struct ResultPackager;

impl ResultPackager {
    /// Packages the ranked results for curator review.
    ///
    /// `paths` must be parallel to `scored` (one path list per prediction);
    /// missing entries render as influences without explanation paths.
    pub fn package(
        &self,
        local_event: LocalEventSummary,
        scored: &[ScoredPrediction],
        paths: &[Vec<ExplanationPath>],
        evidence: &EvidenceBundle,
        subgraph: &Subgraph,
    ) -> Report {
        let statistics = DiscoveryStatistics::from_scored(scored);

        let top_influences = scored
            .iter()
            .enumerate()
            .take(MAX_INFLUENCES)
            .map(|(rank, prediction)| {
                let attributes = subgraph
                    .node(&prediction.prediction.global_event_id)
                    .map(|n| n.attributes.clone())
                    .unwrap_or_default();
                self.influence(
                    prediction,
                    attributes,
                    paths.get(rank).cloned().unwrap_or_default(),
                )
            })
            .collect();

        Report {
            local_event,
            evidence_summary: EvidenceSummary::from_bundle(evidence),
            statistics,
            top_influences,
        }
    }

    fn influence(
        &self,
        scored: &ScoredPrediction,
        attributes: EventAttributes,
        explanation_paths: Vec<ExplanationPath>,
    ) -> Influence {
        Influence {
            global_event: GlobalEventSummary {
                id: scored.prediction.global_event_id.clone(),
                name: attributes.name,
                date: attributes.date.map(|d| d.to_string()),
                location: attributes.location,
                description: attributes.description,
            },
            causal_strength: scored.prediction.causal_strength,
            reliability_score: scored.reliability.percent(),
            final_score: scored.final_score,
            mechanism: scored.prediction.mechanisms.top().label().to_string(),
            mechanism_probs: scored.prediction.mechanisms.clone(),
            constraints: scored.constraints,
            evidence_strength: scored.evidence_strength,
            reliability_components: ReliabilityComponents {
                directness: scored.reliability.directness,
                source_consistency: scored.reliability.source_consistency,
                temporal_proximity: scored.reliability.temporal_proximity,
            },
            prediction_source: scored.prediction.source.clone(),
            explanation_paths,
        }
    }
}
