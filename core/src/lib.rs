//! # Causeway Core
//!
//! Core data model and scoring primitives for the Causeway influence-discovery
//! engine: the typed graph model shared by every pipeline stage, the persisted
//! base-graph loader, the named-event override table, the reliability metric,
//! constraint gating and final-score fusion, explanation-path search, and
//! curator-facing result packaging.
//!
//! The reasoning stages that *produce* predictions (candidate generation,
//! subgraph construction, the embedding model and link predictor) live in the
//! `causeway_reasoning` crate; this crate owns everything they read and write.

pub mod constraints;
pub mod loader;
pub mod overrides;
pub mod paths;
pub mod registry;
pub mod reliability;
pub mod report;
pub mod scoring;
pub mod types;

pub use constraints::{ConstraintChecker, ConstraintPolicy};
pub use loader::{parse_flexible_date, temporal_gap_days, BaseGraph, EdgeRecord, NodeRecord};
pub use overrides::OverrideTable;
pub use paths::{PathConstructor, PathSearchConfig};
pub use registry::default_global_events;
pub use reliability::{EdgeEvidence, ReliabilityCalculator, DAYS_PER_YEAR};
pub use report::{
    DiscoveryStatistics, EvidenceSummary, Influence, LocalEventSummary, Report, ResultPackager,
};
pub use scoring::PredictionScorer;
pub use types::*;
