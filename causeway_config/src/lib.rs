//! # Causeway Config
//!
//! Configuration system for the Causeway influence-discovery pipeline.
//!
//! Provides TOML-based configuration parsing and validation for the base
//! graph files, candidate generation, the embedding model, scoring weights,
//! path search, report shaping, and the knowledge collector.
//!
//! # Configuration Schema
//!
//! The configuration file (`causeway.toml`) supports the following sections:
//! - `[graph]` — base-graph CSV paths and the optional override-table file
//! - `[generator]` — candidate relevance threshold and shortlist cap
//! - `[reasoner]` — GCN dimensions, seed, and base-graph search bounds
//! - `[scoring]` — reliability weights `w_d`, `w_s`, `w_t`
//! - `[paths]` — explanation path depth and count bounds
//! - `[report]` — influence cap and rendering options
//! - `[collect]` — knowledge collector toggle, endpoint, and pacing
//! - `[pipeline]` — default result count and log level
//!
//! # Environment Variable Overrides
//!
//! Commonly deployed fields can be overridden with the `CAUSEWAY_` prefix
//! and `_` as section separator:
//! - `CAUSEWAY_GRAPH_NODES_FILE` → `graph.nodes_file`
//! - `CAUSEWAY_GRAPH_EDGES_FILE` → `graph.edges_file`
//! - `CAUSEWAY_GRAPH_OVERRIDES_FILE` → `graph.overrides_file`
//! - `CAUSEWAY_COLLECT_ENABLED` → `collect.enabled`
//! - `CAUSEWAY_COLLECT_BASE_URL` → `collect.base_url`
//! - `CAUSEWAY_PIPELINE_LOG_LEVEL` → `pipeline.log_level`
//! - `CAUSEWAY_PIPELINE_TOP_K` → `pipeline.top_k`

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Causeway configuration.
///
/// Parsed from `causeway.toml` or constructed programmatically. Environment
/// variables with the `CAUSEWAY_` prefix override TOML values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CausewayConfig {
    /// Base-graph file locations.
    #[serde(default)]
    pub graph: GraphConfig,
    /// Candidate generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Embedding model and base-graph search settings.
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    /// Reliability weights.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Explanation path search bounds.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Report shaping.
    #[serde(default)]
    pub report: ReportConfig,
    /// Knowledge collector settings.
    #[serde(default)]
    pub collect: CollectConfig,
    /// Pipeline-wide settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Base-graph file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Path to the nodes CSV table.
    #[serde(default = "default_nodes_file")]
    pub nodes_file: String,
    /// Path to the edges CSV table.
    #[serde(default = "default_edges_file")]
    pub edges_file: String,
    /// Optional TOML file replacing the built-in override table.
    #[serde(default)]
    pub overrides_file: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            nodes_file: default_nodes_file(),
            edges_file: default_edges_file(),
            overrides_file: None,
        }
    }
}

fn default_nodes_file() -> String {
    "data/nodes_from_history.csv".to_string()
}
fn default_edges_file() -> String {
    "data/edges_template.csv".to_string()
}

/// Candidate generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Minimum composite relevance for the filtered shortlist (default 0.3).
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    /// Hard cap on returned candidates (default 10).
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            max_candidates: default_max_candidates(),
        }
    }
}

fn default_relevance_threshold() -> f32 {
    0.3
}
fn default_max_candidates() -> usize {
    10
}

/// Embedding model and base-graph search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Input feature dimensionality (default 10).
    #[serde(default = "default_input_dim")]
    pub input_dim: usize,
    /// Hidden layer dimensionality (default 64).
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,
    /// Output embedding dimensionality (default 32).
    #[serde(default = "default_output_dim")]
    pub output_dim: usize,
    /// Number of stacked graph-convolution layers (default 3).
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
    /// Dropout rate kept for configuration parity (default 0.2).
    #[serde(default = "default_dropout")]
    pub dropout: f32,
    /// Weight-initialization seed (default 42).
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Maximum hops for base-graph path search (default 3).
    #[serde(default = "default_reasoner_max_depth")]
    pub max_depth: usize,
    /// Maximum base-graph paths per candidate (default 5).
    #[serde(default = "default_reasoner_max_paths")]
    pub max_paths: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            input_dim: default_input_dim(),
            hidden_dim: default_hidden_dim(),
            output_dim: default_output_dim(),
            num_layers: default_num_layers(),
            dropout: default_dropout(),
            seed: default_seed(),
            max_depth: default_reasoner_max_depth(),
            max_paths: default_reasoner_max_paths(),
        }
    }
}

fn default_input_dim() -> usize {
    10
}
fn default_hidden_dim() -> usize {
    64
}
fn default_output_dim() -> usize {
    32
}
fn default_num_layers() -> usize {
    3
}
fn default_dropout() -> f32 {
    0.2
}
fn default_seed() -> u64 {
    42
}
fn default_reasoner_max_depth() -> usize {
    3
}
fn default_reasoner_max_paths() -> usize {
    5
}

/// Reliability weights; normalized downstream, so any positive triple works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight for directness (default 0.4).
    #[serde(default = "default_w_d")]
    pub w_d: f64,
    /// Weight for source consistency (default 0.3).
    #[serde(default = "default_w_s")]
    pub w_s: f64,
    /// Weight for temporal proximity (default 0.3).
    #[serde(default = "default_w_t")]
    pub w_t: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            w_d: default_w_d(),
            w_s: default_w_s(),
            w_t: default_w_t(),
        }
    }
}

fn default_w_d() -> f64 {
    0.4
}
fn default_w_s() -> f64 {
    0.3
}
fn default_w_t() -> f64 {
    0.3
}

/// Explanation path search bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Maximum hops per explanation path (default 4).
    #[serde(default = "default_paths_max_depth")]
    pub max_depth: usize,
    /// Maximum scored paths kept per prediction (default 3).
    #[serde(default = "default_paths_max_paths")]
    pub max_paths: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_paths_max_depth(),
            max_paths: default_paths_max_paths(),
        }
    }
}

fn default_paths_max_depth() -> usize {
    4
}
fn default_paths_max_paths() -> usize {
    3
}

/// Report shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Explanation paths rendered per influence in the text report (default 2).
    #[serde(default = "default_rendered_paths")]
    pub rendered_paths: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            rendered_paths: default_rendered_paths(),
        }
    }
}

fn default_rendered_paths() -> usize {
    2
}

/// Knowledge collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Whether to call the external snippet source at all (default false:
    /// offline runs produce an empty evidence bundle).
    #[serde(default)]
    pub enabled: bool,
    /// REST summary endpoint prefix.
    #[serde(default = "default_collect_base_url")]
    pub base_url: String,
    /// Delay between outbound requests, in milliseconds (default 100).
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Per-request timeout, in seconds (default 5).
    #[serde(default = "default_collect_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_collect_base_url(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_collect_timeout_secs(),
        }
    }
}

fn default_collect_base_url() -> String {
    "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string()
}
fn default_request_delay_ms() -> u64 {
    100
}
fn default_collect_timeout_secs() -> u64 {
    5
}

/// Pipeline-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default number of ranked influences returned (default 10).
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Log level (default "info").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            log_level: default_log_level(),
        }
    }
}

fn default_top_k() -> usize {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl CausewayConfig {
    /// Loads configuration from a TOML file, applies environment overrides,
    /// and validates.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: CausewayConfig =
            toml::from_str(&raw).context("failed to parse causeway.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies `CAUSEWAY_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("CAUSEWAY_GRAPH_NODES_FILE") {
            self.graph.nodes_file = value;
        }
        if let Ok(value) = std::env::var("CAUSEWAY_GRAPH_EDGES_FILE") {
            self.graph.edges_file = value;
        }
        if let Ok(value) = std::env::var("CAUSEWAY_GRAPH_OVERRIDES_FILE") {
            self.graph.overrides_file = Some(value);
        }
        if let Ok(value) = std::env::var("CAUSEWAY_COLLECT_ENABLED") {
            if let Ok(parsed) = value.parse() {
                self.collect.enabled = parsed;
            }
        }
        if let Ok(value) = std::env::var("CAUSEWAY_COLLECT_BASE_URL") {
            self.collect.base_url = value;
        }
        if let Ok(value) = std::env::var("CAUSEWAY_PIPELINE_LOG_LEVEL") {
            self.pipeline.log_level = value;
        }
        if let Ok(value) = std::env::var("CAUSEWAY_PIPELINE_TOP_K") {
            if let Ok(parsed) = value.parse() {
                self.pipeline.top_k = parsed;
            }
        }
    }

    /// Validates cross-field invariants.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scoring.w_d <= 0.0 || self.scoring.w_s <= 0.0 || self.scoring.w_t <= 0.0 {
            bail!("scoring weights must all be positive");
        }
        if !(0.0..=1.0).contains(&self.generator.relevance_threshold) {
            bail!("generator.relevance_threshold must lie in [0, 1]");
        }
        if self.generator.max_candidates == 0 {
            bail!("generator.max_candidates must be positive");
        }
        if self.reasoner.num_layers < 2 {
            bail!("reasoner.num_layers must be at least 2");
        }
        if self.reasoner.input_dim == 0
            || self.reasoner.hidden_dim == 0
            || self.reasoner.output_dim == 0
        {
            bail!("reasoner dimensions must be positive");
        }
        if self.paths.max_depth == 0 || self.paths.max_paths == 0 {
            bail!("paths bounds must be positive");
        }
        if self.pipeline.top_k == 0 {
            bail!("pipeline.top_k must be positive");
        }
        Ok(())
    }

    /// An example `causeway.toml` with the default values, for `--init-config`.
    pub fn example_toml() -> String {
        let config = CausewayConfig::default();
        toml::to_string_pretty(&config).expect("default config serializes")
    }
}
