//! Mechanism-type inference.
//!
//! Assigns every prediction a probability distribution over causal
//! mechanisms by ordered pattern matching: known event archetypes first
//! (checked in priority order), then additive generic keyword buckets.
//! The distribution always normalizes to sum 1; when nothing matches, the
//! neutral default is `economic_shift = 1.0`.

use causeway_core::overrides::OverrideTable;
use causeway_core::types::MechanismDistribution;
use std::sync::Arc;

/// Infers mechanism distributions from event text.
#[derive(Debug, Clone)]
pub struct MechanismInference {
    overrides: Arc<OverrideTable>,
}

impl MechanismInference {
    /// Creates the inference over an override table's archetypes and buckets.
    pub fn new(overrides: Arc<OverrideTable>) -> Self {
        Self { overrides }
    }

    /// Infers the normalized mechanism distribution for an event.
    pub fn infer(&self, event_name: &str, description: &str) -> MechanismDistribution {
        let text = format!("{} {}", event_name, description)
            .to_lowercase()
            .trim()
            .to_string();

        if let Some(archetype) = self.overrides.archetype_distribution(&text) {
            return archetype.normalized();
        }

        let mut distribution = MechanismDistribution::default();
        for bucket in &self.overrides.mechanism_keyword_buckets {
            let hit = bucket
                .keywords
                .iter()
                .any(|kw| text.contains(kw.as_str()));
            if hit {
                distribution.add(bucket.primary, bucket.primary_mass);
                distribution.add(bucket.secondary, bucket.secondary_mass);
            }
        }
        distribution.normalized()
    }
}
