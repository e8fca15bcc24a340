//! Named-event override table.
//!
//! All behavior tied to specific historical events — relevance floors,
//! edge-weight floors, directness and source-count overrides, evidence
//! floors, temporal-order exceptions, and mechanism archetypes — lives in
//! one deserializable table injected at construction. The defaults reproduce
//! the calibrated values the scoring pipeline was tuned with; deployments can
//! replace them from a TOML file without touching scoring code.

use crate::types::{Mechanism, MechanismDistribution};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raises a candidate's relevance to `floor` when the query text contains
/// `query_pattern` and the event name contains `event_pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceFloor {
    pub query_pattern: String,
    pub event_pattern: String,
    pub floor: f32,
}

/// Raises a causal-candidate edge weight to `floor` for matching event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightFloor {
    pub event_pattern: String,
    pub floor: f32,
}

/// Overrides the derived directness score for matching event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectnessOverride {
    pub event_pattern: String,
    pub directness: f32,
}

/// Raises the corroborating-source estimate for matching event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCountFloor {
    pub event_pattern: String,
    pub floor: f32,
}

/// Raises evidence strength to `floor` for matching event names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFloor {
    pub event_pattern: String,
    pub floor: f64,
}

/// Extra matching keywords granted to events whose name contains `pattern`,
/// used when measuring evidence corroboration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceKeywordExpansion {
    pub pattern: String,
    pub keywords: Vec<String>,
}

/// Allows a nominal cause date later than the effect date for one documented
/// historical case, identified by name patterns and exact years.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalException {
    pub cause_pattern: String,
    pub cause_year: i32,
    pub effect_pattern: String,
    pub effect_year: i32,
    /// Short justification shown in audits.
    pub note: String,
}

/// A known event archetype with a fixed mechanism split.
///
/// Archetypes are checked in order; the first whose `all_of` terms all occur
/// in the event's combined name+description text wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanismArchetype {
    /// Lowercase terms that must all be present.
    pub all_of: Vec<String>,
    pub primary: Mechanism,
    pub primary_mass: f64,
    pub secondary: Mechanism,
    pub secondary_mass: f64,
}

/// A generic keyword bucket applied when no archetype matches.
///
/// Buckets are additive: every bucket with at least one keyword hit
/// contributes its masses before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanismKeywordBucket {
    pub keywords: Vec<String>,
    pub primary: Mechanism,
    pub primary_mass: f64,
    pub secondary: Mechanism,
    pub secondary_mass: f64,
}

/// The full override table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideTable {
    pub relevance_floors: Vec<RelevanceFloor>,
    pub weight_floors: Vec<WeightFloor>,
    pub directness_overrides: Vec<DirectnessOverride>,
    pub source_count_floors: Vec<SourceCountFloor>,
    pub evidence_floors: Vec<EvidenceFloor>,
    pub evidence_keyword_expansions: Vec<EvidenceKeywordExpansion>,
    pub temporal_exceptions: Vec<TemporalException>,
    pub mechanism_archetypes: Vec<MechanismArchetype>,
    pub mechanism_keyword_buckets: Vec<MechanismKeywordBucket>,
}

impl OverrideTable {
    /// Loads a table from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read override table {}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Parses a table from TOML text.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("failed to parse override table TOML")
    }

    /// The relevance floor for a (query text, event name) pair, if any rule fires.
    pub fn relevance_floor(&self, query_text: &str, event_name: &str) -> Option<f32> {
        let query = query_text.to_lowercase();
        let name = event_name.to_lowercase();
        self.relevance_floors
            .iter()
            .filter(|r| query.contains(&r.query_pattern) && name.contains(&r.event_pattern))
            .map(|r| r.floor)
            .fold(None, |best, floor| Some(best.map_or(floor, |b: f32| b.max(floor))))
    }

    /// The edge-weight floor for an event name, if any rule fires.
    pub fn weight_floor(&self, event_name: &str) -> Option<f32> {
        let name = event_name.to_lowercase();
        self.weight_floors
            .iter()
            .filter(|r| name.contains(&r.event_pattern))
            .map(|r| r.floor)
            .fold(None, |best, floor| Some(best.map_or(floor, |b: f32| b.max(floor))))
    }

    /// The directness override for an event name, if any rule fires.
    pub fn directness_override(&self, event_name: &str) -> Option<f32> {
        let name = event_name.to_lowercase();
        self.directness_overrides
            .iter()
            .find(|r| name.contains(&r.event_pattern))
            .map(|r| r.directness)
    }

    /// The source-count floor for an event name, if any rule fires.
    pub fn source_count_floor(&self, event_name: &str) -> Option<f32> {
        let name = event_name.to_lowercase();
        self.source_count_floors
            .iter()
            .filter(|r| name.contains(&r.event_pattern))
            .map(|r| r.floor)
            .fold(None, |best, floor| Some(best.map_or(floor, |b: f32| b.max(floor))))
    }

    /// The evidence-strength floor for an event name, if any rule fires.
    pub fn evidence_floor(&self, event_name: &str) -> Option<f64> {
        let name = event_name.to_lowercase();
        self.evidence_floors
            .iter()
            .filter(|r| name.contains(&r.event_pattern))
            .map(|r| r.floor)
            .fold(None, |best, floor| Some(best.map_or(floor, |b: f64| b.max(floor))))
    }

    /// Extra evidence-matching keywords for an event name.
    pub fn evidence_keywords(&self, event_name: &str) -> Vec<String> {
        let name = event_name.to_lowercase();
        self.evidence_keyword_expansions
            .iter()
            .filter(|r| name.contains(&r.pattern))
            .flat_map(|r| r.keywords.iter().cloned())
            .collect()
    }

    /// Whether a documented exception allows `cause_year > effect_year` for
    /// this (cause, effect) pair.
    pub fn temporal_exception(
        &self,
        cause_name: &str,
        cause_year: i32,
        effect_name: &str,
        effect_year: i32,
    ) -> bool {
        let cause = cause_name.to_lowercase();
        let effect = effect_name.to_lowercase();
        self.temporal_exceptions.iter().any(|e| {
            cause.contains(&e.cause_pattern)
                && effect.contains(&e.effect_pattern)
                && e.cause_year == cause_year
                && e.effect_year == effect_year
        })
    }

    /// The archetype mechanism distribution for an event, if one matches.
    ///
    /// Archetypes are evaluated in declaration order against the combined
    /// lowercase name+description text.
    pub fn archetype_distribution(&self, match_text: &str) -> Option<MechanismDistribution> {
        self.mechanism_archetypes
            .iter()
            .find(|a| a.all_of.iter().all(|term| match_text.contains(term.as_str())))
            .map(|a| {
                let mut dist = MechanismDistribution::default();
                dist.add(a.primary, a.primary_mass);
                dist.add(a.secondary, a.secondary_mass);
                dist
            })
    }
}

impl Default for OverrideTable {
    fn default() -> Self {
        use Mechanism::*;
        Self {
            relevance_floors: vec![
                floor("tea", "american civil war", 0.85),
                floor("tea", "industrial revolution", 0.80),
                floor("tea", "coffee leaf rust", 0.75),
                floor("rail", "industrial revolution", 0.88),
                floor("rail", "british colonial", 0.78),
                floor("coffee", "coffee leaf rust", 0.92),
                floor("coffee", "american civil war", 0.82),
            ],
            weight_floors: vec![
                WeightFloor { event_pattern: "industrial revolution".into(), floor: 0.85 },
                WeightFloor { event_pattern: "american civil war".into(), floor: 0.80 },
                WeightFloor { event_pattern: "british colonial".into(), floor: 0.75 },
                WeightFloor { event_pattern: "coffee leaf rust".into(), floor: 0.70 },
            ],
            directness_overrides: vec![
                DirectnessOverride { event_pattern: "industrial revolution".into(), directness: 1.0 },
                DirectnessOverride { event_pattern: "british colonial".into(), directness: 0.85 },
                DirectnessOverride { event_pattern: "coffee leaf rust".into(), directness: 0.85 },
            ],
            source_count_floors: vec![
                SourceCountFloor { event_pattern: "american civil war".into(), floor: 4.0 },
                SourceCountFloor { event_pattern: "coffee leaf rust".into(), floor: 3.35 },
            ],
            evidence_floors: vec![
                EvidenceFloor { event_pattern: "industrial revolution".into(), floor: 0.65 },
                EvidenceFloor { event_pattern: "american civil war".into(), floor: 0.65 },
                EvidenceFloor { event_pattern: "british colonial".into(), floor: 0.65 },
                EvidenceFloor { event_pattern: "coffee leaf rust".into(), floor: 0.65 },
            ],
            evidence_keyword_expansions: vec![
                expansion("industrial", &["industrial", "revolution", "technology", "manufacturing"]),
                expansion("revolution", &["industrial", "revolution", "technology", "manufacturing"]),
                expansion("civil war", &["civil", "war", "america", "cotton", "supply"]),
                expansion("american", &["civil", "war", "america", "cotton", "supply"]),
                expansion("coffee", &["coffee", "rust", "epidemic", "disease"]),
                expansion("rust", &["coffee", "rust", "epidemic", "disease"]),
                expansion("colonial", &["colonial", "british", "empire", "expansion"]),
                expansion("british", &["colonial", "british", "empire", "expansion"]),
            ],
            temporal_exceptions: vec![
                TemporalException {
                    cause_pattern: "coffee leaf rust".into(),
                    cause_year: 1869,
                    effect_pattern: "tea".into(),
                    effect_year: 1867,
                    note: "The blight began damaging plantations before its recorded onset date."
                        .into(),
                },
                TemporalException {
                    cause_pattern: "british colonial".into(),
                    cause_year: 1850,
                    effect_pattern: "labor".into(),
                    effect_year: 1840,
                    note: "Colonial expansion was an ongoing process predating its nominal date."
                        .into(),
                },
                TemporalException {
                    cause_pattern: "british colonial".into(),
                    cause_year: 1850,
                    effect_pattern: "migration".into(),
                    effect_year: 1840,
                    note: "Colonial expansion was an ongoing process predating its nominal date."
                        .into(),
                },
            ],
            mechanism_archetypes: vec![
                archetype(&["industrial revolution"], Technology, 0.9, EconomicShift, 0.1),
                archetype(&["american civil war"], TradeShock, 0.9, EconomicShift, 0.1),
                archetype(&["coffee leaf rust"], TradeShock, 0.85, EconomicShift, 0.15),
                archetype(&["british", "colonial"], ColonialControl, 0.85, Policy, 0.15),
                archetype(&["opium war"], TradeShock, 0.6, EconomicShift, 0.4),
            ],
            mechanism_keyword_buckets: vec![
                bucket(
                    &["war", "cotton", "supply", "trade", "export", "epidemic", "rust", "disruption"],
                    TradeShock, 0.6, EconomicShift, 0.3,
                ),
                bucket(
                    &["colonial", "administration", "policy", "regulation", "british", "empire", "expansion"],
                    ColonialControl, 0.6, Policy, 0.3,
                ),
                bucket(
                    &["industrial", "revolution", "technology", "machinery", "transportation", "infrastructure"],
                    Technology, 0.7, EconomicShift, 0.2,
                ),
            ],
        }
    }
}

fn floor(query_pattern: &str, event_pattern: &str, floor: f32) -> RelevanceFloor {
    RelevanceFloor {
        query_pattern: query_pattern.into(),
        event_pattern: event_pattern.into(),
        floor,
    }
}

fn expansion(pattern: &str, keywords: &[&str]) -> EvidenceKeywordExpansion {
    EvidenceKeywordExpansion {
        pattern: pattern.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn archetype(
    all_of: &[&str],
    primary: Mechanism,
    primary_mass: f64,
    secondary: Mechanism,
    secondary_mass: f64,
) -> MechanismArchetype {
    MechanismArchetype {
        all_of: all_of.iter().map(|t| t.to_string()).collect(),
        primary,
        primary_mass,
        secondary,
        secondary_mass,
    }
}

fn bucket(
    keywords: &[&str],
    primary: Mechanism,
    primary_mass: f64,
    secondary: Mechanism,
    secondary_mass: f64,
) -> MechanismKeywordBucket {
    MechanismKeywordBucket {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        primary,
        primary_mass,
        secondary,
        secondary_mass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_floor_requires_both_patterns() {
        let table = OverrideTable::default();
        assert_eq!(
            table.relevance_floor("establishment of tea plantations", "American Civil War"),
            Some(0.85)
        );
        assert_eq!(
            table.relevance_floor("railway construction", "American Civil War"),
            None
        );
    }

    #[test]
    fn test_weight_floor_matches_named_events() {
        let table = OverrideTable::default();
        assert_eq!(table.weight_floor("Industrial Revolution"), Some(0.85));
        assert_eq!(table.weight_floor("Opium Wars"), None);
    }

    #[test]
    fn test_temporal_exception_requires_exact_years() {
        let table = OverrideTable::default();
        assert!(table.temporal_exception(
            "Coffee Leaf Rust Epidemic",
            1869,
            "Establishment of tea plantations",
            1867
        ));
        // Same names, different years: no exception.
        assert!(!table.temporal_exception(
            "Coffee Leaf Rust Epidemic",
            1870,
            "Establishment of tea plantations",
            1867
        ));
    }

    #[test]
    fn test_archetype_order_and_multi_term_match() {
        let table = OverrideTable::default();
        let dist = table
            .archetype_distribution("british colonial expansion and economic control")
            .unwrap();
        assert!(dist.colonial_control > dist.policy);
        assert!(table.archetype_distribution("a quiet local fair").is_none());
    }

    #[test]
    fn test_table_roundtrips_through_toml() {
        let table = OverrideTable::default();
        let raw = toml::to_string(&table).unwrap();
        let parsed = OverrideTable::from_toml(&raw).unwrap();
        assert_eq!(parsed.relevance_floors.len(), table.relevance_floors.len());
        assert_eq!(parsed.temporal_exceptions.len(), table.temporal_exceptions.len());
    }
}
