//! Candidate generation.
//!
//! Scores an immutable registry of known global events against one curator
//! query plus its collected evidence, and returns a ranked shortlist. The
//! composite relevance blends text-index similarity, keyword overlap, entity
//! presence, and a decaying temporal bucket, with named-event relevance
//! floors applied from the override table.

use crate::text_index::TextIndex;
use causeway_core::overrides::OverrideTable;
use causeway_core::types::{Candidate, CuratorQuery, EvidenceBundle, GlobalEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tuning constants for candidate generation.
///
/// The boost thresholds and the relevance cutoff are calibration constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Minimum composite relevance for the filtered shortlist.
    pub relevance_threshold: f32,
    /// Hard cap on returned candidates regardless of `top_k`.
    pub max_candidates: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.3,
            max_candidates: 10,
        }
    }
}

/// Scores registry events against queries.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    registry: Vec<GlobalEvent>,
    index: TextIndex,
    overrides: Arc<OverrideTable>,
    config: GeneratorConfig,
}

impl CandidateGenerator {
    /// Builds the generator and its text index over the registry.
    pub fn new(
        registry: Vec<GlobalEvent>,
        overrides: Arc<OverrideTable>,
        config: GeneratorConfig,
    ) -> Self {
        let documents: Vec<String> = registry
            .iter()
            .map(|e| format!("{} {} {}", e.name, e.description, e.keywords.join(" ")))
            .collect();
        Self {
            registry,
            index: TextIndex::fit(&documents),
            overrides,
            config,
        }
    }

    /// The injected registry.
    pub fn registry(&self) -> &[GlobalEvent] {
        &self.registry
    }

    /// Generates the ranked candidate shortlist for one query.
    ///
    /// Never returns an empty list for a non-empty registry: when no event
    /// clears the relevance threshold, the unfiltered top-k is returned
    /// instead.
    pub fn generate(
        &self,
        query: &CuratorQuery,
        evidence: &EvidenceBundle,
        top_k: usize,
    ) -> Vec<Candidate> {
        if self.registry.is_empty() {
            return Vec::new();
        }

        let mut search_text = format!(
            "{} {}",
            query.local_event_text,
            query.keywords.join(" ")
        );
        for snippet in &evidence.raw_text_evidence {
            search_text.push(' ');
            search_text.push_str(&snippet.extract);
        }

        let similarities = self.index.similarities(&search_text);

        let mut candidates: Vec<Candidate> = self
            .registry
            .iter()
            .zip(&similarities)
            .map(|(event, &similarity)| self.score_event(event, similarity as f32, query))
            .collect();

        candidates.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let cap = top_k.min(self.config.max_candidates);
        let filtered: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.relevance_score > self.config.relevance_threshold)
            .cloned()
            .take(cap)
            .collect();

        if filtered.is_empty() {
            tracing::debug!("no candidate cleared the relevance threshold; returning top-k");
            candidates.truncate(cap);
            candidates
        } else {
            filtered
        }
    }

    fn score_event(&self, event: &GlobalEvent, similarity: f32, query: &CuratorQuery) -> Candidate {
        let keyword_match = keyword_match(query, event);
        let entity_match = entity_match(query, event);
        let temporal_relevance = temporal_relevance(query, event);

        // Mild boosts for signals that already cleared a floor.
        let similarity_boost = if similarity > 0.3 { similarity * 1.2 } else { similarity };
        let keyword_boost = if keyword_match > 0.2 { keyword_match * 1.3 } else { keyword_match };

        let mut relevance = 0.35 * similarity_boost.min(1.0)
            + 0.35 * keyword_boost.min(1.0)
            + 0.15 * entity_match
            + 0.15 * temporal_relevance;

        if let Some(floor) = self
            .overrides
            .relevance_floor(&query.local_event_text, &event.name)
        {
            relevance = relevance.max(floor);
        }

        Candidate {
            event: event.clone(),
            relevance_score: relevance.clamp(0.0, 1.0),
            similarity_score: similarity.clamp(0.0, 1.0),
            keyword_match,
            entity_match,
            temporal_relevance,
        }
    }
}

/// Fraction of query keywords present in the event's keyword set.
fn keyword_match(query: &CuratorQuery, event: &GlobalEvent) -> f32 {
    if query.keywords.is_empty() {
        return 0.0;
    }
    let overlap = query
        .keywords
        .iter()
        .filter(|kw| event.keywords.iter().any(|ek| ek == *kw))
        .count();
    (overlap as f32 / query.keywords.len() as f32).min(1.0)
}

/// Fraction of query entities textually present in the event name+description.
fn entity_match(query: &CuratorQuery, event: &GlobalEvent) -> f32 {
    if query.entities.is_empty() {
        return 0.0;
    }
    let text = event.match_text();
    let matches = query
        .entities
        .iter()
        .filter(|entity| text.contains(&entity.to_lowercase()))
        .count();
    (matches as f32 / query.entities.len() as f32).min(1.0)
}

/// Decaying-bucket temporal score.
///
/// Events at or before the query year decay with the gap (1.0 within 10
/// years, 0.8 within 50, 0.6 within 100, else 0.4); events strictly after
/// the query year score 0.2; unknown dates are neutral at 0.5.
fn temporal_relevance(query: &CuratorQuery, event: &GlobalEvent) -> f32 {
    let (Some(query_year), Some(event_year)) = (query.year(), event.year()) else {
        return 0.5;
    };
    if event_year <= query_year {
        match query_year - event_year {
            0..=10 => 1.0,
            11..=50 => 0.8,
            51..=100 => 0.6,
            _ => 0.4,
        }
    } else {
        0.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causeway_core::registry::default_global_events;
    use causeway_core::types::{DateRange, Snippet};
    use chrono::NaiveDate;

    fn generator() -> CandidateGenerator {
        CandidateGenerator::new(
            default_global_events(),
            Arc::new(OverrideTable::default()),
            GeneratorConfig::default(),
        )
    }

    fn tea_query() -> CuratorQuery {
        CuratorQuery {
            local_event_text: "Establishment of tea plantations".into(),
            date_range: DateRange::for_year(1867),
            location: Some("Hill Country".into()),
            entities: vec!["British".into()],
            keywords: vec!["establishment".into(), "plantations".into(), "tea".into()],
        }
    }

    fn cotton_evidence() -> EvidenceBundle {
        EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                title: "Cotton famine".into(),
                extract: "The American Civil War disrupted global cotton supply chains, \
                          shifting plantation investment toward tea and coffee"
                    .into(),
                url: String::new(),
                source: "wikipedia".into(),
            }],
            ..Default::default()
        }
        .assemble()
    }

    #[test]
    fn test_tea_scenario_surfaces_both_expected_candidates() {
        let generator = generator();
        let candidates = generator.generate(&tea_query(), &cotton_evidence(), 10);
        let names: Vec<&str> = candidates.iter().map(|c| c.event.name.as_str()).collect();
        assert!(names.contains(&"American Civil War"), "got {names:?}");
        assert!(names.contains(&"Industrial Revolution"), "got {names:?}");
        for candidate in &candidates {
            assert!(candidate.relevance_score > 0.3);
        }
    }

    #[test]
    fn test_relevance_floor_orders_civil_war_first_for_tea() {
        let generator = generator();
        let candidates = generator.generate(&tea_query(), &cotton_evidence(), 10);
        assert_eq!(candidates[0].event.name, "American Civil War");
        assert!(candidates[0].relevance_score >= 0.85);
    }

    #[test]
    fn test_temporal_relevance_buckets() {
        let query = tea_query();
        let mut event = default_global_events().remove(1); // Civil War, 1861
        assert_eq!(temporal_relevance(&query, &event), 1.0); // 6-year gap

        event.date = NaiveDate::from_ymd_opt(1760, 1, 1); // 107-year gap
        assert_eq!(temporal_relevance(&query, &event), 0.4);

        event.date = NaiveDate::from_ymd_opt(1830, 1, 1); // 37-year gap
        assert_eq!(temporal_relevance(&query, &event), 0.8);

        event.date = NaiveDate::from_ymd_opt(1900, 1, 1); // future event
        assert_eq!(temporal_relevance(&query, &event), 0.2);

        event.date = None;
        assert_eq!(temporal_relevance(&query, &event), 0.5);
    }

    #[test]
    fn test_fallback_returns_top_k_when_nothing_clears_threshold() {
        // A registry with no textual overlap with the query.
        let registry = vec![GlobalEvent {
            id: "GLOBAL_900".into(),
            name: "Bronze Age Collapse".into(),
            date: None,
            location: "Mediterranean".into(),
            description: "Palatial economies fell apart".into(),
            keywords: vec!["bronze".into(), "collapse".into()],
        }];
        let generator = CandidateGenerator::new(
            registry,
            Arc::new(OverrideTable::default()),
            GeneratorConfig::default(),
        );
        let query = CuratorQuery {
            local_event_text: "Opening of a porcelain workshop".into(),
            keywords: vec!["porcelain".into(), "workshop".into()],
            ..Default::default()
        };
        let candidates = generator.generate(&query, &EvidenceBundle::default(), 5);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].relevance_score <= 0.3);
    }

    #[test]
    fn test_empty_registry_returns_empty() {
        let generator = CandidateGenerator::new(
            Vec::new(),
            Arc::new(OverrideTable::default()),
            GeneratorConfig::default(),
        );
        assert!(generator
            .generate(&tea_query(), &EvidenceBundle::default(), 5)
            .is_empty());
    }

    #[test]
    fn test_candidate_cap_applies_regardless_of_top_k() {
        let generator = generator();
        let candidates = generator.generate(&tea_query(), &cotton_evidence(), 500);
        assert!(candidates.len() <= 10);
    }

    #[test]
    fn test_keyword_match_fraction() {
        let query = tea_query();
        let event = &default_global_events()[0]; // Industrial Revolution
        // No query keyword appears in the event keyword set.
        assert_eq!(keyword_match(&query, event), 0.0);

        let mut query = query;
        query.keywords = vec!["technology".into(), "porcelain".into()];
        assert_eq!(keyword_match(&query, event), 0.5);
    }
}
