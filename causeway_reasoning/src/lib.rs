//! # Causeway Reasoning
//!
//! The prediction-producing stages of the Causeway pipeline: the
//! text-similarity index and candidate generator, the per-query subgraph
//! constructor, the deterministic GCN embedding model, the dual-mode link
//! predictor, and mechanism-type inference.
//!
//! Everything here consumes and produces types from `causeway_core`; the
//! orchestration that wires these stages into one request lives in
//! `causeway_pipeline`.

pub mod candidates;
pub mod gcn;
pub mod mechanism;
pub mod predictor;
pub mod subgraph;
pub mod text_index;

pub use candidates::{CandidateGenerator, GeneratorConfig};
pub use gcn::{normalized_adjacency, GcnConfig, GcnModel};
pub use mechanism::MechanismInference;
pub use predictor::{LinkPredictor, PredictorConfig};
pub use subgraph::{SubgraphBuilder, SubgraphConfig};
pub use text_index::{tokenize, TextIndex};
