//! The causal-confidence reliability metric.
//!
//! Implements `R = w_d*D + w_s*S + w_t*T` where:
//! - **D** (directness) is the edge's directness score clamped into [0, 1];
//! - **S** (source consistency) is `source_count / max_sources_required`,
//!   clamped into [0, 1];
//! - **T** (temporal proximity) is `exp(-dt_years)` with
//!   `dt_years = temporal_gap_days / 365.25`, so `T(0) = 1` and T decays
//!   strictly toward 0 as the gap grows.
//!
//! Weights are normalized to sum to 1 at construction, so callers may supply
//! any positive triple.

use crate::types::ReliabilityScore;
use serde::{Deserialize, Serialize};

/// Mean days per year, accounting for leap years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Numeric inputs for one reliability computation, read from an edge snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgeEvidence {
    /// Directness of link in [0, 1].
    pub directness_score: f64,
    /// Number of independent corroborating sources.
    pub source_count: f64,
    /// Number of sources required for full corroboration.
    pub max_sources_required: f64,
    /// Gap between cause and effect dates, in days.
    pub temporal_gap_days: f64,
}

impl Default for EdgeEvidence {
    fn default() -> Self {
        Self {
            directness_score: 0.5,
            source_count: 2.0,
            max_sources_required: 5.0,
            temporal_gap_days: 0.0,
        }
    }
}

/// Computes reliability scores with normalized component weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReliabilityCalculator {
    w_d: f64,
    w_s: f64,
    w_t: f64,
}

impl Default for ReliabilityCalculator {
    fn default() -> Self {
        Self::new(0.4, 0.3, 0.3)
    }
}

impl ReliabilityCalculator {
    /// Creates a calculator, normalizing the weights to sum to 1.
    ///
    /// A non-positive weight sum leaves the weights as given (and every
    /// reliability computed with them at 0).
    pub fn new(w_d: f64, w_s: f64, w_t: f64) -> Self {
        let total = w_d + w_s + w_t;
        if total > 0.0 {
            Self {
                w_d: w_d / total,
                w_s: w_s / total,
                w_t: w_t / total,
            }
        } else {
            Self { w_d, w_s, w_t }
        }
    }

    /// The normalized weight triple `(w_d, w_s, w_t)`.
    pub fn weights(&self) -> (f64, f64, f64) {
        (self.w_d, self.w_s, self.w_t)
    }

    /// D: directness clamped into [0, 1].
    pub fn directness(&self, directness_score: f64) -> f64 {
        directness_score.clamp(0.0, 1.0)
    }

    /// S: `source_count / max_sources_required`, clamped into [0, 1].
    ///
    /// A non-positive `max_sources_required` yields 0.
    pub fn source_consistency(&self, source_count: f64, max_sources_required: f64) -> f64 {
        if max_sources_required <= 0.0 {
            return 0.0;
        }
        (source_count / max_sources_required).clamp(0.0, 1.0)
    }

    /// T: `exp(-temporal_gap_days / 365.25)`, clamped into [0, 1].
    pub fn temporal_proximity(&self, temporal_gap_days: f64) -> f64 {
        let gap_years = temporal_gap_days / DAYS_PER_YEAR;
        (-gap_years).exp().clamp(0.0, 1.0)
    }

    /// Computes the full reliability score for one edge snapshot.
    pub fn calculate(&self, evidence: EdgeEvidence) -> ReliabilityScore {
        let directness = self.directness(evidence.directness_score);
        let source_consistency =
            self.source_consistency(evidence.source_count, evidence.max_sources_required);
        let temporal_proximity = self.temporal_proximity(evidence.temporal_gap_days);

        ReliabilityScore {
            directness,
            source_consistency,
            temporal_proximity,
            reliability: self.w_d * directness
                + self.w_s * source_consistency
                + self.w_t * temporal_proximity,
        }
    }
}
