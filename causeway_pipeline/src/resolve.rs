//! Local-event resolution against the base registry.
//!
//! Matches the curator's free text to a local node from the base graph:
//! first by substring against event and exhibit names, then by best keyword
//! overlap with the node's name and description. Returns `None` when no
//! local node relates to the query at all; the pipeline converts that into
//! a structured not-found outcome rather than an error.

use causeway_core::loader::{BaseGraph, NodeRecord};
use causeway_core::report::LocalEventSummary;
use causeway_core::types::{CuratorQuery, EventAttributes, Node, NodeKind};

/// A resolved local event: the subgraph node plus its report summary.
#[derive(Debug, Clone)]
pub struct ResolvedLocalEvent {
    pub node: Node,
    pub summary: LocalEventSummary,
}

/// Resolves the query to a local event in the base graph.
pub fn find_local_event(base: &BaseGraph, query: &CuratorQuery) -> Option<ResolvedLocalEvent> {
    let search_text = query.local_event_text.to_lowercase();

    // Exact pass: the query text names the event or exhibit directly.
    for record in base.local_records() {
        let event_name = record.event_name.to_lowercase();
        let exhibit_name = record
            .exhibit_name
            .as_deref()
            .unwrap_or("")
            .to_lowercase();
        if event_name.contains(&search_text)
            || (!exhibit_name.is_empty() && exhibit_name.contains(&search_text))
            || search_text.contains(&event_name)
        {
            return Some(resolved(record));
        }
    }

    // Fallback pass: best keyword overlap against name + description.
    let mut best: Option<(&NodeRecord, usize)> = None;
    for record in base.local_records() {
        let event_text = format!(
            "{} {}",
            record.event_name,
            record.description.as_deref().unwrap_or("")
        )
        .to_lowercase();
        let words: Vec<&str> = event_text.split_whitespace().collect();
        let overlap = query
            .keywords
            .iter()
            .filter(|kw| words.contains(&kw.as_str()))
            .count();
        if overlap > best.map(|(_, score)| score).unwrap_or(0) {
            best = Some((record, overlap));
        }
    }

    best.map(|(record, _)| resolved(record))
}

fn resolved(record: &NodeRecord) -> ResolvedLocalEvent {
    let date = record.parsed_date();
    let node = Node::new(
        record.node_id.clone(),
        NodeKind::Local,
        EventAttributes {
            name: record.event_name.clone(),
            date,
            location: record.location.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            exhibit_name: record.exhibit_name.clone(),
            ..Default::default()
        },
    );
    let summary = LocalEventSummary {
        id: record.node_id.clone(),
        name: record.event_name.clone(),
        exhibit_name: record.exhibit_name.clone(),
        date: date.map(|d| d.to_string()),
        location: record.location.clone().unwrap_or_default(),
        description: record.description.clone().unwrap_or_default(),
    };
    ResolvedLocalEvent { node, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causeway_core::loader::EdgeRecord;

    fn record(id: &str, node_type: &str, name: &str, exhibit: Option<&str>, desc: &str) -> NodeRecord {
        NodeRecord {
            node_id: id.into(),
            node_type: node_type.into(),
            event_name: name.into(),
            date: Some("1867-01-01".into()),
            location: Some("Central Highlands".into()),
            description: Some(desc.into()),
            purpose: None,
            exhibit_name: exhibit.map(|e| e.into()),
            source_count: Some(3.0),
            max_sources_required: Some(5.0),
        }
    }

    fn base() -> BaseGraph {
        BaseGraph::from_records(
            vec![
                record(
                    "LOCAL_001",
                    "local",
                    "Establishment of tea plantations",
                    Some("Ceylon Tea Story"),
                    "Tea estates established across the hill country",
                ),
                record(
                    "LOCAL_002",
                    "local",
                    "Railway line to Kandy",
                    None,
                    "Upcountry railway construction for plantation transport",
                ),
                record("GLOBAL_001", "global", "Industrial Revolution", None, ""),
            ],
            Vec::<EdgeRecord>::new(),
        )
    }

    fn query(text: &str, keywords: &[&str]) -> CuratorQuery {
        CuratorQuery {
            local_event_text: text.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match_on_event_name() {
        let resolved = find_local_event(&base(), &query("tea plantations", &[])).unwrap();
        assert_eq!(resolved.node.id, "LOCAL_001");
        assert_eq!(resolved.summary.exhibit_name.as_deref(), Some("Ceylon Tea Story"));
    }

    #[test]
    fn test_exact_match_on_exhibit_name() {
        let resolved = find_local_event(&base(), &query("ceylon tea story", &[])).unwrap();
        assert_eq!(resolved.node.id, "LOCAL_001");
    }

    #[test]
    fn test_keyword_fallback_picks_best_overlap() {
        let resolved = find_local_event(
            &base(),
            &query(
                "how did the upcountry line come about",
                &["railway", "construction", "upcountry"],
            ),
        )
        .unwrap();
        assert_eq!(resolved.node.id, "LOCAL_002");
    }

    #[test]
    fn test_unrelated_query_resolves_to_none() {
        let result = find_local_event(
            &base(),
            &query("porcelain kiln firing schedule", &["porcelain", "kiln"]),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_global_nodes_are_never_resolved() {
        let result = find_local_event(&base(), &query("industrial revolution", &[]));
        assert!(result.is_none());
    }
}
