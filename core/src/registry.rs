//! Global-event registry.
//!
//! The registry of known global events is immutable configuration data
//! injected at construction time, so every scoring component can be tested
//! in isolation against a registry variant. The default registry ships the
//! five events the system was calibrated with.

use crate::types::GlobalEvent;
use chrono::NaiveDate;

/// The default registry of known global events.
pub fn default_global_events() -> Vec<GlobalEvent> {
    vec![
        event(
            "GLOBAL_001",
            "Industrial Revolution",
            NaiveDate::from_ymd_opt(1760, 1, 1),
            "Europe",
            "Technological and economic transformation creating global demand for commodities",
            &["industrial", "revolution", "technology", "manufacturing", "economic", "transformation"],
        ),
        event(
            "GLOBAL_002",
            "American Civil War",
            NaiveDate::from_ymd_opt(1861, 4, 12),
            "United States",
            "War disrupting global cotton supply chains causing economic shifts worldwide",
            &["civil", "war", "america", "cotton", "supply", "disruption", "economic"],
        ),
        event(
            "GLOBAL_003",
            "Opium Wars",
            NaiveDate::from_ymd_opt(1839, 1, 1),
            "China",
            "British-Chinese conflicts affecting global trade routes and colonial strategies",
            &["opium", "war", "china", "british", "trade", "colonial"],
        ),
        event(
            "GLOBAL_004",
            "Coffee Leaf Rust Epidemic",
            NaiveDate::from_ymd_opt(1869, 1, 1),
            "Global",
            "Global coffee leaf rust disease devastated coffee plantations worldwide",
            &["coffee", "rust", "disease", "epidemic", "plantation", "agricultural"],
        ),
        event(
            "GLOBAL_005",
            "British Colonial Expansion",
            NaiveDate::from_ymd_opt(1850, 1, 1),
            "Global",
            "Expansion of British colonial empire and economic control",
            &["british", "colonial", "empire", "expansion", "economic", "control"],
        ),
    ]
}

fn event(
    id: &str,
    name: &str,
    date: Option<NaiveDate>,
    location: &str,
    description: &str,
    keywords: &[&str],
) -> GlobalEvent {
    GlobalEvent {
        id: id.to_string(),
        name: name.to_string(),
        date,
        location: location.to_string(),
        description: description.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}
