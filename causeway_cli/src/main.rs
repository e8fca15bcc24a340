//! # Causeway CLI
//!
//! Curator-facing command line for the influence-discovery pipeline.
//!
//! ```bash
//! # Discover influences for an exhibit event
//! causeway --nodes data/nodes_from_history.csv --edges data/edges_template.csv \
//!     --input "Establishment of tea plantations" --date 1867
//!
//! # Structured output
//! causeway --input "Establishment of tea plantations" --json
//!
//! # Generate an example causeway.toml and exit
//! causeway --init-config
//!
//! # With no --input, an interactive prompt loop starts
//! causeway
//! ```

use anyhow::Context;
use causeway_collect::{KnowledgeSource, StaticSource, WikipediaConfig, WikipediaSource};
use causeway_config::CausewayConfig;
use causeway_pipeline::{render_outcome, InfluencePipeline};
use clap::Parser;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Discover plausible global causes for a localized exhibit event.
#[derive(Parser, Debug)]
#[command(name = "causeway")]
#[command(about = "Global-local historical influence discovery for curators")]
#[command(version)]
struct Cli {
    /// Path to causeway.toml. Can also be set via CAUSEWAY_CONFIG.
    #[arg(short, long, env = "CAUSEWAY_CONFIG")]
    config: Option<String>,

    /// Generate an example causeway.toml on stdout and exit.
    #[arg(long)]
    init_config: bool,

    /// Path to the nodes CSV table (overrides the config file).
    #[arg(long)]
    nodes: Option<String>,

    /// Path to the edges CSV table (overrides the config file).
    #[arg(long)]
    edges: Option<String>,

    /// Local event text or exhibit name.
    #[arg(short, long)]
    input: Option<String>,

    /// Optional event date (YYYY or YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,

    /// Optional event location.
    #[arg(long)]
    location: Option<String>,

    /// Number of top results to return.
    #[arg(long)]
    top_k: Option<usize>,

    /// Emit the structured JSON outcome instead of the text report.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        println!("{}", CausewayConfig::example_toml());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => CausewayConfig::from_file(path)?,
        None => {
            let mut config = CausewayConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            config
        }
    };
    if let Some(nodes) = &cli.nodes {
        config.graph.nodes_file = nodes.clone();
    }
    if let Some(edges) = &cli.edges {
        config.graph.edges_file = edges.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.pipeline.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = build_source(&config);
    let pipeline = InfluencePipeline::new(&config, source);

    match &cli.input {
        Some(input) => {
            run_query(&pipeline, &config, &cli, input)?;
        }
        None => {
            interactive_loop(&pipeline, &config, &cli)?;
        }
    }

    Ok(())
}

fn build_source(config: &CausewayConfig) -> Box<dyn KnowledgeSource> {
    if config.collect.enabled {
        Box::new(WikipediaSource::new(WikipediaConfig {
            base_url: config.collect.base_url.clone(),
            request_delay: Duration::from_millis(config.collect.request_delay_ms),
            timeout: Duration::from_secs(config.collect.timeout_secs),
            ..Default::default()
        }))
    } else {
        tracing::info!("knowledge collection disabled; running with empty evidence");
        Box::new(StaticSource::empty())
    }
}

fn run_query(
    pipeline: &InfluencePipeline,
    config: &CausewayConfig,
    cli: &Cli,
    input: &str,
) -> anyhow::Result<()> {
    let outcome = pipeline.process(input, cli.date.as_deref(), cli.location.as_deref(), cli.top_k);
    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("failed to encode outcome")?;
        println!("{json}");
    } else {
        println!("{}", render_outcome(&outcome, config.report.rendered_paths));
    }
    Ok(())
}

fn interactive_loop(
    pipeline: &InfluencePipeline,
    config: &CausewayConfig,
    cli: &Cli,
) -> anyhow::Result<()> {
    println!("Causeway — global-local historical influence discovery");
    println!("Enter a local event or exhibit name; 'quit' to exit.\n");

    let stdin = std::io::stdin();
    loop {
        print!("event> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        run_query(pipeline, config, cli, input)?;
        println!();
    }

    Ok(())
}
