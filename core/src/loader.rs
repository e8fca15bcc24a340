//! Base-graph loading from tabular files.
//!
//! The persisted base historical graph is two CSV tables: a nodes table
//! describing local and global events, and an edges table describing causal
//! links with provenance fields. The loader builds an indexed [`BaseGraph`]
//! with per-node feature vectors and a directed adjacency list, ready for
//! the embedding model and base-graph path search.
//!
//! Node ids referenced only by the edge table still receive an index and a
//! default (zero) feature vector, so both tables always address one
//! connected id set.

use crate::types::{NodeId, FEATURE_DIM};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// One row of the nodes table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: String,
    /// `local` or `global`.
    pub node_type: String,
    pub event_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub exhibit_name: Option<String>,
    #[serde(default)]
    pub source_count: Option<f32>,
    #[serde(default)]
    pub max_sources_required: Option<f32>,
}

impl NodeRecord {
    /// Whether this row describes a local (exhibit-scale) event.
    pub fn is_local(&self) -> bool {
        self.node_type.eq_ignore_ascii_case("local")
    }

    /// The parsed calendar date, when present and parsable.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_flexible_date)
    }

    /// The event year, when a date is known.
    pub fn year(&self) -> Option<i32> {
        self.parsed_date().map(|d| d.year())
    }
}

/// One row of the edges table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    #[serde(default)]
    pub causal_description: Option<String>,
    #[serde(default)]
    pub directness_score: Option<f32>,
    #[serde(default)]
    pub source_count: Option<f32>,
    #[serde(default)]
    pub max_sources_required: Option<f32>,
}

/// Per-edge numeric attributes used by the embedding model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgeAttributes {
    pub directness_score: f32,
    pub source_count: f32,
    pub max_sources_required: f32,
    pub temporal_gap_days: f64,
}

/// The indexed, read-only base historical graph.
///
/// Built once at pipeline construction and shared read-only thereafter.
#[derive(Debug, Clone)]
pub struct BaseGraph {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    node_to_idx: HashMap<NodeId, usize>,
    idx_to_node: Vec<NodeId>,
    records_by_id: HashMap<NodeId, usize>,
    /// `FEATURE_DIM`-length feature vector per indexed id.
    features: Vec<[f32; FEATURE_DIM]>,
    /// Calendar date per indexed id, when known.
    dates: Vec<Option<NaiveDate>>,
    /// Directed adjacency: node index -> successor indices.
    adjacency: Vec<Vec<usize>>,
    /// Edge attributes, parallel to `edges`.
    edge_attributes: Vec<EdgeAttributes>,
    /// Endpoint indices, parallel to `edges`.
    edge_endpoints: Vec<(usize, usize)>,
}

impl BaseGraph {
    /// Loads and indexes the base graph from the two CSV tables.
    pub fn load(nodes_path: impl AsRef<Path>, edges_path: impl AsRef<Path>) -> Result<Self> {
        let nodes_path = nodes_path.as_ref();
        let edges_path = edges_path.as_ref();

        let nodes = read_records::<NodeRecord>(nodes_path)
            .with_context(|| format!("failed to load nodes table {}", nodes_path.display()))?;
        let edges = read_records::<EdgeRecord>(edges_path)
            .with_context(|| format!("failed to load edges table {}", edges_path.display()))?;

        Ok(Self::from_records(nodes, edges))
    }

    /// Builds the indexed graph from already-parsed records.
    pub fn from_records(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        // Index the union of ids from both tables, sorted for determinism.
        let mut ids: BTreeSet<NodeId> = nodes.iter().map(|n| n.node_id.clone()).collect();
        for edge in &edges {
            ids.insert(edge.source_node_id.clone());
            ids.insert(edge.target_node_id.clone());
        }

        let idx_to_node: Vec<NodeId> = ids.into_iter().collect();
        let node_to_idx: HashMap<NodeId, usize> = idx_to_node
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        let records_by_id: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(pos, n)| (n.node_id.clone(), pos))
            .collect();

        let mut features = vec![[0.0f32; FEATURE_DIM]; idx_to_node.len()];
        let mut dates = vec![None; idx_to_node.len()];
        for (idx, id) in idx_to_node.iter().enumerate() {
            if let Some(&pos) = records_by_id.get(id) {
                let record = &nodes[pos];
                let source_count = record.source_count.unwrap_or(0.0);
                let max_sources = record.max_sources_required.unwrap_or(5.0);
                let mut vector = [0.0f32; FEATURE_DIM];
                vector[0] = if record.is_local() { 1.0 } else { 0.0 };
                vector[1] = source_count;
                vector[2] = max_sources;
                vector[3] = source_count / max_sources.max(1.0);
                features[idx] = vector;
                dates[idx] = record.parsed_date();
            }
        }

        let mut adjacency = vec![Vec::new(); idx_to_node.len()];
        let mut edge_attributes = Vec::with_capacity(edges.len());
        let mut edge_endpoints = Vec::with_capacity(edges.len());
        for edge in &edges {
            let source = node_to_idx[&edge.source_node_id];
            let target = node_to_idx[&edge.target_node_id];
            adjacency[source].push(target);
            edge_endpoints.push((source, target));
            edge_attributes.push(EdgeAttributes {
                directness_score: edge.directness_score.unwrap_or(0.5),
                source_count: edge.source_count.unwrap_or(0.0),
                max_sources_required: edge.max_sources_required.unwrap_or(5.0),
                temporal_gap_days: temporal_gap_days(dates[source], dates[target]),
            });
        }

        Self {
            nodes,
            edges,
            node_to_idx,
            idx_to_node,
            records_by_id,
            features,
            dates,
            adjacency,
            edge_attributes,
            edge_endpoints,
        }
    }

    /// Number of indexed node ids (union of both tables).
    pub fn node_count(&self) -> usize {
        self.idx_to_node.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `id` is addressable in this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.node_to_idx.contains_key(id)
    }

    /// The index for a node id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_to_idx.get(id).copied()
    }

    /// The node id at an index.
    pub fn id_at(&self, idx: usize) -> Option<&str> {
        self.idx_to_node.get(idx).map(String::as_str)
    }

    /// The calendar date of the node at an index, when known.
    pub fn date_at(&self, idx: usize) -> Option<NaiveDate> {
        self.dates.get(idx).copied().flatten()
    }

    /// The nodes-table record for an id, when present.
    pub fn record(&self, id: &str) -> Option<&NodeRecord> {
        self.records_by_id.get(id).map(|&pos| &self.nodes[pos])
    }

    /// All nodes-table records.
    pub fn records(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Records describing local (exhibit-scale) events.
    pub fn local_records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter().filter(|n| n.is_local())
    }

    /// The feature matrix, one `FEATURE_DIM` row per indexed id.
    pub fn features(&self) -> &[[f32; FEATURE_DIM]] {
        &self.features
    }

    /// Successor indices of a node index.
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// Endpoint index pairs, parallel to the edges table.
    pub fn edge_endpoints(&self) -> &[(usize, usize)] {
        &self.edge_endpoints
    }

    /// Attributes for the directed edge between two indices, if present.
    pub fn edge_attributes_between(&self, source: usize, target: usize) -> Option<EdgeAttributes> {
        self.edge_endpoints
            .iter()
            .position(|&(s, t)| s == source && t == target)
            .map(|pos| self.edge_attributes[pos])
    }
}

/// Parses a date string as `YYYY-MM-DD`, falling back to a bare year
/// (mapped to January 1st). Returns `None` for anything unparsable.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    let year_part = raw.split('-').next().unwrap_or(raw);
    let year_part = if year_part.len() >= 4 { &year_part[..4] } else { year_part };
    year_part
        .parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

/// Absolute gap in days between two optional dates; 0 when either is unknown.
pub fn temporal_gap_days(a: Option<NaiveDate>, b: Option<NaiveDate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => (b - a).num_days().abs() as f64,
        _ => 0.0,
    }
}

fn read_records<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NODES_CSV: &str = "\
node_id,node_type,event_name,date,location,description,purpose,exhibit_name,source_count,max_sources_required
LOCAL_001,local,Establishment of tea plantations,1867-01-01,Central Highlands,Tea estates established in the hill country,exhibit,Ceylon Tea Story,3,5
GLOBAL_002,global,American Civil War,1861-04-12,United States,War disrupting cotton supply,context,,4,5
GLOBAL_001,global,Industrial Revolution,1760,Europe,Technological transformation,context,,3,5
";

    const EDGES_CSV: &str = "\
edge_id,source_node_id,target_node_id,causal_description,directness_score,source_count,max_sources_required
E1,GLOBAL_002,LOCAL_001,Cotton disruption shifted plantation economics,0.9,4,5
E2,GLOBAL_001,GLOBAL_002,Industrialization raised commodity demand,0.7,3,5
";

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn load_fixture() -> BaseGraph {
        let nodes = write_fixture(NODES_CSV);
        let edges = write_fixture(EDGES_CSV);
        BaseGraph::load(nodes.path(), edges.path()).unwrap()
    }

    #[test]
    fn test_loads_and_indexes_union_of_ids() {
        let graph = load_fixture();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains("LOCAL_001"));
        assert!(graph.contains("GLOBAL_001"));
        // Sorted index is deterministic.
        assert_eq!(graph.id_at(0), Some("GLOBAL_001"));
        assert_eq!(graph.id_at(2), Some("LOCAL_001"));
    }

    #[test]
    fn test_feature_vectors_follow_record_fields() {
        let graph = load_fixture();
        let local = graph.index_of("LOCAL_001").unwrap();
        let features = graph.features()[local];
        assert_eq!(features[0], 1.0);
        assert_eq!(features[1], 3.0);
        assert_eq!(features[2], 5.0);
        assert!((features[3] - 0.6).abs() < 1e-6);
        assert_eq!(features[4..], [0.0; FEATURE_DIM - 4]);

        let global = graph.index_of("GLOBAL_002").unwrap();
        assert_eq!(graph.features()[global][0], 0.0);
    }

    #[test]
    fn test_adjacency_is_directed() {
        let graph = load_fixture();
        let source = graph.index_of("GLOBAL_002").unwrap();
        let target = graph.index_of("LOCAL_001").unwrap();
        assert!(graph.successors(source).contains(&target));
        assert!(!graph.successors(target).contains(&source));
    }

    #[test]
    fn test_edge_temporal_gap_from_node_dates() {
        let graph = load_fixture();
        let source = graph.index_of("GLOBAL_002").unwrap();
        let target = graph.index_of("LOCAL_001").unwrap();
        let attrs = graph.edge_attributes_between(source, target).unwrap();
        // 1861-04-12 to 1867-01-01.
        assert_eq!(attrs.temporal_gap_days, 2090.0);
        assert_eq!(attrs.directness_score, 0.9);
    }

    #[test]
    fn test_year_only_dates_parse() {
        assert_eq!(
            parse_flexible_date("1760"),
            NaiveDate::from_ymd_opt(1760, 1, 1)
        );
        assert_eq!(
            parse_flexible_date("1861-04-12"),
            NaiveDate::from_ymd_opt(1861, 4, 12)
        );
        assert_eq!(parse_flexible_date("nan"), None);
        assert_eq!(parse_flexible_date("unknown"), None);
    }

    #[test]
    fn test_edge_only_ids_get_default_features() {
        let nodes = write_fixture(NODES_CSV);
        let edges_extra = write_fixture(
            "edge_id,source_node_id,target_node_id,causal_description,directness_score,source_count,max_sources_required\n\
             E1,GLOBAL_009,LOCAL_001,unknown origin,0.5,1,5\n",
        );
        let graph = BaseGraph::load(nodes.path(), edges_extra.path()).unwrap();
        assert!(graph.contains("GLOBAL_009"));
        let idx = graph.index_of("GLOBAL_009").unwrap();
        assert_eq!(graph.features()[idx], [0.0; FEATURE_DIM]);
        assert!(graph.record("GLOBAL_009").is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = BaseGraph::load("/nonexistent/nodes.csv", "/nonexistent/edges.csv");
        assert!(err.is_err());
    }
}
