//! End-to-end pipeline orchestration.
//!
//! Wires the stages into one synchronous request path: parse input, resolve
//! the local event, collect evidence, generate candidates, construct the
//! subgraph, predict links, gate and score, build explanation paths, and
//! package the report.
//!
//! The public entry point is total: no error propagates out of
//! [`InfluencePipeline::process`]. A missing local event becomes a
//! structured not-found outcome; a missing or malformed base graph degrades
//! to fallback scoring at construction time.

use crate::query::CuratorInputParser;
use crate::resolve::{find_local_event, ResolvedLocalEvent};
use causeway_collect::KnowledgeSource;
use causeway_config::CausewayConfig;
use causeway_core::constraints::{ConstraintChecker, ConstraintPolicy};
use causeway_core::loader::BaseGraph;
use causeway_core::overrides::OverrideTable;
use causeway_core::paths::{PathConstructor, PathSearchConfig};
use causeway_core::registry::default_global_events;
use causeway_core::reliability::ReliabilityCalculator;
use causeway_core::report::{Report, ResultPackager};
use causeway_core::scoring::PredictionScorer;
use causeway_core::types::{ExplanationPath, GlobalEvent};
use causeway_reasoning::candidates::{CandidateGenerator, GeneratorConfig};
use causeway_reasoning::gcn::{GcnConfig, GcnModel};
use causeway_reasoning::mechanism::MechanismInference;
use causeway_reasoning::predictor::{LinkPredictor, PredictorConfig};
use causeway_reasoning::subgraph::SubgraphBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Candidates requested from the generator before shortlist capping.
const CANDIDATE_POOL: usize = 50;

/// The total outcome of one curator request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The packaged report; `top_influences` may legitimately be empty.
    Report(Report),
    /// No local event in the base registry matched the query.
    NotFound {
        input: String,
        error: String,
        suggestion: String,
    },
}

impl PipelineOutcome {
    /// Whether a report was produced.
    pub fn is_report(&self) -> bool {
        matches!(self, PipelineOutcome::Report(_))
    }

    /// The report, when one was produced.
    pub fn report(&self) -> Option<&Report> {
        match self {
            PipelineOutcome::Report(report) => Some(report),
            PipelineOutcome::NotFound { .. } => None,
        }
    }
}

/// The assembled discovery pipeline.
///
/// Constructed once per process; the base graph and embedding model are
/// loaded here and treated as read-only for the process lifetime. Each call
/// to [`InfluencePipeline::process`] builds private per-query state only.
pub struct InfluencePipeline {
    parser: CuratorInputParser,
    source: Box<dyn KnowledgeSource>,
    generator: CandidateGenerator,
    subgraph_builder: SubgraphBuilder,
    predictor: LinkPredictor,
    scorer: PredictionScorer,
    path_constructor: PathConstructor,
    packager: ResultPackager,
    base: Option<Arc<BaseGraph>>,
    default_top_k: usize,
}

impl InfluencePipeline {
    /// Builds the pipeline with the default global-event registry.
    pub fn new(config: &CausewayConfig, source: Box<dyn KnowledgeSource>) -> Self {
        Self::with_registry(config, default_global_events(), source)
    }

    /// Builds the pipeline with an injected registry.
    ///
    /// Base-graph load failures are logged and degrade the reasoner to
    /// edge-fallback scoring; they never fail construction.
    pub fn with_registry(
        config: &CausewayConfig,
        registry: Vec<GlobalEvent>,
        source: Box<dyn KnowledgeSource>,
    ) -> Self {
        let overrides = Arc::new(load_overrides(config));

        let base = match BaseGraph::load(&config.graph.nodes_file, &config.graph.edges_file) {
            Ok(graph) => {
                tracing::info!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "base graph loaded"
                );
                Some(Arc::new(graph))
            }
            Err(err) => {
                tracing::warn!(error = %err, "base graph unavailable; using fallback scoring");
                None
            }
        };

        let generator = CandidateGenerator::new(
            registry,
            Arc::clone(&overrides),
            GeneratorConfig {
                relevance_threshold: config.generator.relevance_threshold,
                max_candidates: config.generator.max_candidates,
            },
        );

        let model = GcnModel::new(GcnConfig {
            input_dim: config.reasoner.input_dim,
            hidden_dim: config.reasoner.hidden_dim,
            output_dim: config.reasoner.output_dim,
            num_layers: config.reasoner.num_layers,
            dropout: config.reasoner.dropout,
            seed: config.reasoner.seed,
        });
        let predictor = LinkPredictor::new(
            base.clone(),
            model,
            MechanismInference::new(Arc::clone(&overrides)),
            PredictorConfig {
                max_depth: config.reasoner.max_depth,
                max_paths: config.reasoner.max_paths,
                ..Default::default()
            },
        );

        let scorer = PredictionScorer::new(
            ConstraintChecker::new(ConstraintPolicy::default()),
            ReliabilityCalculator::new(config.scoring.w_d, config.scoring.w_s, config.scoring.w_t),
            Arc::clone(&overrides),
        );

        let path_constructor = PathConstructor::new(PathSearchConfig {
            max_depth: config.paths.max_depth,
            max_paths: config.paths.max_paths,
        });

        Self {
            parser: CuratorInputParser::default(),
            source,
            subgraph_builder: SubgraphBuilder::with_defaults(overrides),
            generator,
            predictor,
            scorer,
            path_constructor,
            packager: ResultPackager,
            base,
            default_top_k: config.pipeline.top_k,
        }
    }

    /// Whether a base graph was loaded.
    pub fn has_base_graph(&self) -> bool {
        self.base.is_some()
    }

    /// Processes one curator request end to end.
    pub fn process(
        &self,
        input_text: &str,
        date: Option<&str>,
        location: Option<&str>,
        top_k: Option<usize>,
    ) -> PipelineOutcome {
        let top_k = top_k.unwrap_or(self.default_top_k);
        let query = self.parser.parse(input_text, date, location);
        tracing::info!(
            text = %query.local_event_text,
            year = ?query.year(),
            "processing curator query"
        );

        let Some(local) = self.resolve_local(&query) else {
            return PipelineOutcome::NotFound {
                input: input_text.to_string(),
                error: format!("Could not find local event matching: {input_text}"),
                suggestion:
                    "Check the event name or use an exhibit name from the base registry."
                        .to_string(),
            };
        };
        tracing::info!(local = %local.node.id, "resolved local event");

        let evidence = self.source.collect(&query);
        tracing::debug!(snippets = evidence.raw_text_evidence.len(), "evidence collected");

        let candidates = self.generator.generate(&query, &evidence, CANDIDATE_POOL);
        tracing::debug!(count = candidates.len(), "candidates generated");

        let local_id = local.node.id.clone();
        let subgraph = self
            .subgraph_builder
            .build(Some(local.node.clone()), &candidates, &evidence);

        let predictions = self.predictor.predict_links(&subgraph, &local_id, top_k);
        let scored = self.scorer.score(predictions, &subgraph, &evidence);
        tracing::info!(scored = scored.len(), "predictions scored");

        let paths: Vec<Vec<ExplanationPath>> = scored
            .iter()
            .map(|prediction| self.path_constructor.construct(prediction, &subgraph))
            .collect();

        PipelineOutcome::Report(self.packager.package(
            local.summary,
            &scored,
            &paths,
            &evidence,
            &subgraph,
        ))
    }

    fn resolve_local(&self, query: &causeway_core::types::CuratorQuery) -> Option<ResolvedLocalEvent> {
        let base = self.base.as_ref()?;
        find_local_event(base, query)
    }
}

/// Loads the override table from the configured file, or the defaults.
fn load_overrides(config: &CausewayConfig) -> OverrideTable {
    match &config.graph.overrides_file {
        Some(path) => match OverrideTable::from_toml_file(path) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(error = %err, "override table unreadable; using defaults");
                OverrideTable::default()
            }
        },
        None => OverrideTable::default(),
    }
}

