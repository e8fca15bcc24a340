//! Core data types for the Causeway influence-discovery engine.
//!
//! Defines the typed graph model (nodes, edges, the per-query subgraph), the
//! candidate/prediction/score types that flow through the pipeline, and the
//! boundary types exchanged with the input parser and knowledge collector.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph (e.g. `GLOBAL_002`, `LOCAL_014`).
pub type NodeId = String;

/// Length of the numeric feature vector attached to every node.
///
/// Vectors shorter than this are zero-padded by the loader.
pub const FEATURE_DIM: usize = 10;

/// Flexible metadata value supporting common JSON-like types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Returns the value as `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Classification of nodes in the influence graph.
///
/// - **Local**: the narrowly-scoped exhibit event the curator is examining.
/// - **Global**: a broad historical event hypothesized as a possible cause.
/// - **Intermediate**: a bridge entity (commodity, region) synthesized from
///   evidence at query time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Exhibit-scale event under examination.
    Local,
    /// Large-scale candidate cause.
    Global,
    /// Query-time bridge entity (commodity, geopolitical entity).
    Intermediate,
}

/// Classification of edges in the influence graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Hypothesized causal influence from a global candidate onto the local event.
    CausalCandidate,
    /// A candidate event mentions/affects a bridge entity.
    Mentions,
    /// A bridge entity relates to the local event.
    RelatedTo,
}

/// Category of causal pathway connecting a global cause to a local effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    /// Disruption of trade or commodity supply.
    TradeShock,
    /// Administrative or legislative action.
    Policy,
    /// Technological change (machinery, transport, infrastructure).
    Technology,
    /// Broad economic restructuring.
    EconomicShift,
    /// Colonial administration and imperial control.
    ColonialControl,
}

impl Mechanism {
    /// All mechanism categories, in a fixed display order.
    pub const ALL: [Mechanism; 5] = [
        Mechanism::TradeShock,
        Mechanism::Policy,
        Mechanism::Technology,
        Mechanism::EconomicShift,
        Mechanism::ColonialControl,
    ];

    /// Snake-case label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Mechanism::TradeShock => "trade_shock",
            Mechanism::Policy => "policy",
            Mechanism::Technology => "technology",
            Mechanism::EconomicShift => "economic_shift",
            Mechanism::ColonialControl => "colonial_control",
        }
    }
}

/// A probability distribution over causal mechanisms.
///
/// Invariant: after [`MechanismDistribution::normalized`], the five entries
/// sum to 1.0 (within floating tolerance). An all-zero raw distribution
/// normalizes to `economic_shift = 1.0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MechanismDistribution {
    pub trade_shock: f64,
    pub policy: f64,
    pub technology: f64,
    pub economic_shift: f64,
    pub colonial_control: f64,
}

impl MechanismDistribution {
    /// Returns the probability mass assigned to `mechanism`.
    pub fn get(&self, mechanism: Mechanism) -> f64 {
        match mechanism {
            Mechanism::TradeShock => self.trade_shock,
            Mechanism::Policy => self.policy,
            Mechanism::Technology => self.technology,
            Mechanism::EconomicShift => self.economic_shift,
            Mechanism::ColonialControl => self.colonial_control,
        }
    }

    /// Adds `mass` to `mechanism`.
    pub fn add(&mut self, mechanism: Mechanism, mass: f64) {
        match mechanism {
            Mechanism::TradeShock => self.trade_shock += mass,
            Mechanism::Policy => self.policy += mass,
            Mechanism::Technology => self.technology += mass,
            Mechanism::EconomicShift => self.economic_shift += mass,
            Mechanism::ColonialControl => self.colonial_control += mass,
        }
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.trade_shock + self.policy + self.technology + self.economic_shift + self.colonial_control
    }

    /// Normalizes the distribution to sum to 1.0.
    ///
    /// An all-zero distribution defaults to `economic_shift = 1.0` so that a
    /// valid distribution is always produced.
    pub fn normalized(mut self) -> Self {
        let total = self.total();
        if total > 0.0 {
            self.trade_shock /= total;
            self.policy /= total;
            self.technology /= total;
            self.economic_shift /= total;
            self.colonial_control /= total;
        } else {
            self.economic_shift = 1.0;
        }
        self
    }

    /// The mechanism with the highest probability mass.
    pub fn top(&self) -> Mechanism {
        let mut best = Mechanism::EconomicShift;
        let mut best_mass = f64::MIN;
        for m in Mechanism::ALL {
            let mass = self.get(m);
            if mass > best_mass {
                best = m;
                best_mass = mass;
            }
        }
        best
    }
}

/// Descriptive attributes shared by all node kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventAttributes {
    /// Human-readable event or entity name.
    pub name: String,
    /// Calendar date when known.
    pub date: Option<NaiveDate>,
    /// Free-form location string.
    #[serde(default)]
    pub location: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Keyword set used for matching.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Exhibit name, for local nodes loaded from the base graph.
    #[serde(default)]
    pub exhibit_name: Option<String>,
    /// Bridge-entity category (`commodity`, `entity`) for intermediate nodes.
    #[serde(default)]
    pub category: Option<String>,
}

impl EventAttributes {
    /// The event year, when a date is known.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

/// A node in the influence graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique identifier.
    pub id: NodeId,
    /// Node classification.
    pub kind: NodeKind,
    /// Descriptive attributes.
    pub attributes: EventAttributes,
    /// Fixed-length numeric feature vector (zero-padded to [`FEATURE_DIM`]).
    pub features: Vec<f32>,
}

impl Node {
    /// Creates a node with a zero feature vector.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, attributes: EventAttributes) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes,
            features: vec![0.0; FEATURE_DIM],
        }
    }
}

/// A directed, weighted edge in the influence graph.
///
/// `weight` and `directness_score` are clamped into [0, 1] at construction
/// and on every mutation through [`Edge::set_weight`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Query-local identifier (`EDGE_{n}`, sequential).
    pub id: String,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Semantic type of the relationship.
    pub edge_type: EdgeType,
    /// Relationship strength in [0, 1].
    pub weight: f32,
    /// How unmediated the connection is, in [0, 1].
    pub directness_score: f32,
    /// Number of independent corroborating sources.
    pub source_count: f32,
    /// Number of sources required for full corroboration (> 0).
    pub max_sources_required: f32,
    /// Gap between cause and effect dates, in days (>= 0).
    pub temporal_gap_days: f64,
    /// Extensible key-value metadata.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Edge {
    /// Creates an edge with clamped scores and default provenance fields.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: EdgeType,
        weight: f32,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type,
            weight: weight.clamp(0.0, 1.0),
            directness_score: 0.5,
            source_count: 0.0,
            max_sources_required: 5.0,
            temporal_gap_days: 0.0,
            metadata: HashMap::new(),
        }
    }

    /// Sets the weight, clamped into [0, 1].
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    /// Reads a numeric metadata entry.
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(Value::as_f64)
    }
}

/// A per-query graph scoped to one curator request.
///
/// Holds the local node (index 0 when present), candidate global nodes and
/// synthesized intermediate nodes, plus directed weighted edges. Discarded
/// when the query completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subgraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
}

impl Subgraph {
    /// Creates an empty subgraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning its index. Duplicate ids return the existing index.
    pub fn add_node(&mut self, node: Node) -> usize {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        idx
    }

    /// Adds an edge. Both endpoints must already be present.
    pub fn add_edge(&mut self, edge: Edge) {
        debug_assert!(self.index.contains_key(&edge.source));
        debug_assert!(self.index.contains_key(&edge.target));
        self.edges.push(edge);
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Whether a node id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The directed edge from `source` to `target`, if any.
    pub fn edge_between(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Directed edges arriving at `target`.
    pub fn edges_into<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.target == target)
    }

    /// Ids of nodes reachable from `source` by one directed edge.
    pub fn out_neighbors<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> {
        self.edges
            .iter()
            .filter(move |e| e.source == source)
            .map(|e| e.target.as_str())
    }

    /// Nodes of the given kind, in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }
}

/// A known global event in the candidate registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalEvent {
    /// Registry node id (e.g. `GLOBAL_001`).
    pub id: NodeId,
    /// Event name.
    pub name: String,
    /// Nominal event date when known.
    pub date: Option<NaiveDate>,
    /// Free-form location string.
    pub location: String,
    /// Free-form description.
    pub description: String,
    /// Keyword set used for matching.
    pub keywords: Vec<String>,
}

impl GlobalEvent {
    /// The event year, when a date is known.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Name and description, lowercased, for pattern matching.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.name, self.description).to_lowercase()
    }
}

/// A global event scored against one query. Ephemeral within a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The registry event this candidate refers to.
    pub event: GlobalEvent,
    /// Composite relevance in [0, 1].
    pub relevance_score: f32,
    /// Text-index cosine similarity in [0, 1].
    pub similarity_score: f32,
    /// Query-keyword overlap fraction in [0, 1].
    pub keyword_match: f32,
    /// Query-entity presence fraction in [0, 1].
    pub entity_match: f32,
    /// Decaying-bucket temporal score in [0, 1].
    pub temporal_relevance: f32,
}

/// Which computation produced a prediction's causal-strength score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionSource {
    /// Graph-embedding path over the persisted base graph.
    Embedded {
        /// Base-graph node indices along the best connecting path.
        path: Vec<usize>,
    },
    /// Direct edge-weight fallback over the query subgraph.
    EdgeFallback {
        /// Id of the subgraph edge the score was read from.
        edge_id: String,
    },
}

/// A predicted causal link from a global candidate to the local event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Candidate global event node id.
    pub global_event_id: NodeId,
    /// Local event node id.
    pub local_event_id: NodeId,
    /// Causal strength in [0, 1].
    pub causal_strength: f32,
    /// Provenance of the score (embedding path vs edge fallback).
    pub source: PredictionSource,
    /// Normalized mechanism distribution.
    pub mechanisms: MechanismDistribution,
}

/// Outcome of the three plausibility constraints for one prediction.
///
/// `passed` is true iff at least one of the three holds — a deliberately
/// lenient bar, because query-time candidate edges often lack complete
/// provenance. Calibration constant, not an algorithmic invariant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstraintResult {
    /// Cause year <= effect year (or a documented exception).
    pub temporal_order: bool,
    /// Locations or trade context make the influence geographically plausible.
    pub geographic_plausibility: bool,
    /// Source counts are within the allowed corroboration range.
    pub source_consistency: bool,
    /// At least one constraint holds.
    pub passed: bool,
}

impl ConstraintResult {
    /// Derives `passed` from the three component booleans.
    pub fn from_components(
        temporal_order: bool,
        geographic_plausibility: bool,
        source_consistency: bool,
    ) -> Self {
        Self {
            temporal_order,
            geographic_plausibility,
            source_consistency,
            passed: temporal_order || geographic_plausibility || source_consistency,
        }
    }
}

/// The formally weighted reliability metric `R = w_d*D + w_s*S + w_t*T`.
///
/// Immutable once computed for a given edge snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReliabilityScore {
    /// Directness of link, in [0, 1].
    pub directness: f64,
    /// Source consistency, in [0, 1].
    pub source_consistency: f64,
    /// Temporal proximity `exp(-dt_years)`, in (0, 1].
    pub temporal_proximity: f64,
    /// Weighted fusion of the three components, in [0, 1].
    pub reliability: f64,
}

impl ReliabilityScore {
    /// The reliability on a 0-100 display scale.
    pub fn percent(&self) -> f64 {
        self.reliability * 100.0
    }
}

/// A prediction with constraints, reliability, evidence, and final rank score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPrediction {
    /// The underlying prediction (possibly with a penalized causal strength).
    pub prediction: Prediction,
    /// Constraint check outcome.
    pub constraints: ConstraintResult,
    /// Reliability metric for the supporting edge.
    pub reliability: ReliabilityScore,
    /// Evidence corroboration strength in [0, 1].
    pub evidence_strength: f64,
    /// Blended rank score in [0, 1].
    pub final_score: f64,
}

/// A human-explainable path from a global candidate to the local event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationPath {
    /// Ordered node-id sequence from cause to effect.
    pub nodes: Vec<NodeId>,
    /// Edge weight for each hop (`nodes.len() - 1` entries).
    pub edge_weights: Vec<f32>,
    /// Aggregate path score.
    pub score: f64,
    /// Rendered natural-language explanation.
    pub explanation: String,
}

impl ExplanationPath {
    /// Number of hops (edges) along the path.
    pub fn hop_count(&self) -> usize {
        self.edge_weights.len()
    }
}

// ---------------------------------------------------------------------------
// Boundary types — input parser and knowledge collector
// ---------------------------------------------------------------------------

/// Structured query produced by the curator input parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratorQuery {
    /// Normalized free-text description of the local event.
    pub local_event_text: String,
    /// Extracted or supplied date range.
    pub date_range: Option<DateRange>,
    /// Extracted or supplied location.
    pub location: Option<String>,
    /// Extracted entity mentions.
    pub entities: Vec<String>,
    /// Extracted keywords (stop words removed).
    pub keywords: Vec<String>,
}

impl CuratorQuery {
    /// The query year, when a date range is known.
    pub fn year(&self) -> Option<i32> {
        self.date_range.as_ref().map(|r| r.year)
    }
}

/// A calendar range with its representative year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive range start.
    pub start: NaiveDate,
    /// Inclusive range end.
    pub end: NaiveDate,
    /// Representative year for temporal scoring.
    pub year: i32,
}

impl DateRange {
    /// A range covering the whole of `year`.
    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
            year,
        })
    }

    /// A single-day range.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
            year: date.year(),
        }
    }
}

/// One collected text snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snippet {
    /// Source document title.
    pub title: String,
    /// Extracted text.
    pub extract: String,
    /// Source URL when known.
    #[serde(default)]
    pub url: String,
    /// Source label (`wikipedia`, `archive`, `book`, ...).
    #[serde(default)]
    pub source: String,
}

/// Evidence collected for one query; every channel may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    /// Snippets found for the local event text itself.
    pub wikipedia_snippets: Vec<Snippet>,
    /// Snippets found for extracted entities.
    pub entity_mentions: Vec<Snippet>,
    /// Snippets found for commodities mentioned in the query.
    pub related_commodities: Vec<Snippet>,
    /// Snippets found for context keywords.
    pub context_keywords: Vec<Snippet>,
    /// Union of all channels, in collection order.
    pub raw_text_evidence: Vec<Snippet>,
}

impl EvidenceBundle {
    /// Rebuilds `raw_text_evidence` as the concatenation of all channels.
    pub fn assemble(mut self) -> Self {
        self.raw_text_evidence = self
            .wikipedia_snippets
            .iter()
            .chain(&self.entity_mentions)
            .chain(&self.related_commodities)
            .chain(&self.context_keywords)
            .cloned()
            .collect();
        self
    }

    /// Whether no snippet was collected on any channel.
    pub fn is_empty(&self) -> bool {
        self.raw_text_evidence.is_empty()
    }
}

/// Default commodity vocabulary scanned for in queries and evidence.
pub const COMMODITY_VOCABULARY: &[&str] = &[
    "tea", "coffee", "cotton", "sugar", "spice", "rubber", "coconut",
    "cinnamon", "pepper", "cocoa", "tobacco", "opium", "silk",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_distribution_normalizes_to_one() {
        let dist = MechanismDistribution {
            trade_shock: 0.6,
            economic_shift: 0.3,
            ..Default::default()
        }
        .normalized();
        assert!((dist.total() - 1.0).abs() < 1e-9);
        assert_eq!(dist.top(), Mechanism::TradeShock);
    }

    #[test]
    fn test_mechanism_distribution_zero_defaults_to_economic_shift() {
        let dist = MechanismDistribution::default().normalized();
        assert!((dist.economic_shift - 1.0).abs() < 1e-9);
        assert!((dist.total() - 1.0).abs() < 1e-9);
        assert_eq!(dist.top(), Mechanism::EconomicShift);
    }

    #[test]
    fn test_edge_weight_clamped() {
        let mut edge = Edge::new("EDGE_0", "a", "b", EdgeType::CausalCandidate, 1.7);
        assert_eq!(edge.weight, 1.0);
        edge.set_weight(-0.3);
        assert_eq!(edge.weight, 0.0);
    }

    #[test]
    fn test_constraint_result_passed_is_disjunction() {
        let all_false = ConstraintResult::from_components(false, false, false);
        assert!(!all_false.passed);
        let one_true = ConstraintResult::from_components(false, true, false);
        assert!(one_true.passed);
    }

    #[test]
    fn test_subgraph_lookup_and_neighbors() {
        let mut graph = Subgraph::new();
        graph.add_node(Node::new("a", NodeKind::Global, EventAttributes::default()));
        graph.add_node(Node::new("b", NodeKind::Local, EventAttributes::default()));
        graph.add_edge(Edge::new("EDGE_0", "a", "b", EdgeType::CausalCandidate, 0.8));

        assert!(graph.contains("a"));
        assert!(graph.edge_between("a", "b").is_some());
        assert!(graph.edge_between("b", "a").is_none());
        let neighbors: Vec<_> = graph.out_neighbors("a").collect();
        assert_eq!(neighbors, vec!["b"]);
        assert_eq!(graph.edges_into("b").count(), 1);
    }

    #[test]
    fn test_duplicate_node_keeps_first_index() {
        let mut graph = Subgraph::new();
        let first = graph.add_node(Node::new("a", NodeKind::Global, EventAttributes::default()));
        let second = graph.add_node(Node::new("a", NodeKind::Global, EventAttributes::default()));
        assert_eq!(first, second);
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_evidence_bundle_assembles_all_channels() {
        let bundle = EvidenceBundle {
            wikipedia_snippets: vec![Snippet {
                title: "t".into(),
                ..Default::default()
            }],
            entity_mentions: vec![Snippet::default(), Snippet::default()],
            ..Default::default()
        }
        .assemble();
        assert_eq!(bundle.raw_text_evidence.len(), 3);
        assert!(!bundle.is_empty());
    }
}
