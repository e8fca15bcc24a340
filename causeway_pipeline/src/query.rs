//! Curator input parsing.
//!
//! Normalizes free-text curator input into a [`CuratorQuery`]: extracts a
//! date range (explicit argument first, then a year found in the text), a
//! location from a gazetteer, entity mentions, and stop-word-filtered
//! keywords. Heuristic text normalization only; no semantic parsing.

use causeway_core::loader::parse_flexible_date;
use causeway_core::types::{CuratorQuery, DateRange};

/// Words dropped during keyword extraction.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "by",
];

/// Maximum keywords kept per query.
const MAX_KEYWORDS: usize = 10;

/// Heuristic curator input parser with injectable gazetteers.
#[derive(Debug, Clone)]
pub struct CuratorInputParser {
    /// Known location names, checked as case-insensitive substrings.
    locations: Vec<String>,
    /// Known entity names, checked as case-insensitive substrings.
    entities: Vec<String>,
}

impl Default for CuratorInputParser {
    fn default() -> Self {
        Self {
            locations: [
                "Sri Lanka",
                "Ceylon",
                "Colombo",
                "Kandy",
                "Central Highlands",
                "Hill Country",
                "Plantation Regions",
                "Central Province",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            entities: [
                "British",
                "Britain",
                "United Kingdom",
                "Sri Lanka",
                "Ceylon",
                "India",
                "China",
                "America",
                "American",
                "United States",
                "Europe",
                "European",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl CuratorInputParser {
    /// Creates a parser with custom gazetteers.
    pub fn new(locations: Vec<String>, entities: Vec<String>) -> Self {
        Self { locations, entities }
    }

    /// Parses curator input into a structured query.
    ///
    /// Explicit `date` and `location` arguments take precedence over
    /// anything extracted from the text.
    pub fn parse(
        &self,
        input_text: &str,
        date: Option<&str>,
        location: Option<&str>,
    ) -> CuratorQuery {
        let text = input_text.trim().to_string();

        let date_range = match date {
            Some(raw) => parse_date_argument(raw),
            None => extract_year(&text).and_then(DateRange::for_year),
        };

        let location = match location {
            Some(raw) => Some(raw.trim().to_string()),
            None => self.extract_location(&text),
        };

        CuratorQuery {
            entities: self.extract_entities(&text),
            keywords: extract_keywords(&text),
            local_event_text: text,
            date_range,
            location,
        }
    }

    fn extract_location(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        self.locations
            .iter()
            .find(|loc| lower.contains(&loc.to_lowercase()))
            .cloned()
    }

    fn extract_entities(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.entities
            .iter()
            .filter(|entity| lower.contains(&entity.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// Parses an explicit date argument: a bare year or a full `YYYY-MM-DD`.
fn parse_date_argument(raw: &str) -> Option<DateRange> {
    let raw = raw.trim();
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok().and_then(DateRange::for_year);
    }
    parse_flexible_date(raw).map(DateRange::for_date)
}

/// The first plausible 4-digit year in the text.
fn extract_year(text: &str) -> Option<i32> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|t| t.len() == 4)
        .filter_map(|t| t.parse::<i32>().ok())
        .find(|&year| (1000..=2100).contains(&year))
}

/// Lowercase tokens longer than 3 characters, stop words removed, capped.
fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 3 && !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .take(MAX_KEYWORDS)
        .collect()
}
