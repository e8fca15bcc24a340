//! # Causeway Pipeline
//!
//! End-to-end orchestration of the influence-discovery pipeline: curator
//! input parsing, local-event resolution against the base registry, the
//! synchronous stage chain (candidates → subgraph → link prediction →
//! constraint scoring → explanation paths → packaging), and plain-text
//! rendering of the result.
//!
//! The entry point is [`InfluencePipeline::process`], which is total: every
//! layer-local failure is converted to a graceful fallback or a structured
//! [`PipelineOutcome::NotFound`].

pub mod pipeline;
pub mod query;
pub mod render;
pub mod resolve;

pub use pipeline::{InfluencePipeline, PipelineOutcome};
pub use query::CuratorInputParser;
pub use render::{render_outcome, render_report};
pub use resolve::{find_local_event, ResolvedLocalEvent};
