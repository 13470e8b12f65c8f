//! Commons Graph CLI: list the source catalog, run a sync cycle, or lay out
//! a single graph file

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use commons_graph::{
    resolve_sources, GraphConfig, GraphFilter, GraphSession, LiveGraphStore, MergeEngine,
    MultiEdgeLayout, RawGraph, RenderGraph,
};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "commons-graph", version, about = "Federated knowledge graph merge engine")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured source catalog
    Sources {
        /// YAML configuration; the built-in catalog when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fetch and merge sources, then print the live graph
    Sync {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Source id to enable; defaults to the catalog's enabled sources
        #[arg(long = "enable")]
        enable: Vec<String>,

        /// Hide edges marked as proposed
        #[arg(long)]
        hide_proposed: bool,
    },
    /// Merge one RawGraph JSON file and print its edge layout
    Layout {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        bow_step: Option<f64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sources { config } => run_sources(config.as_deref(), &cli.format),
        Commands::Sync {
            config,
            enable,
            hide_proposed,
        } => run_sync(config.as_deref(), enable, hide_proposed, &cli.format).await,
        Commands::Layout { input, bow_step } => run_layout(&input, bow_step, &cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<GraphConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => GraphConfig::load(path)?,
        None => GraphConfig::default(),
    })
}

fn run_sources(
    config: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config.sources)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["id", "title", "enabled", "file", "about"]);
            for source in &config.sources {
                let about = source
                    .subtitle
                    .as_deref()
                    .or(source.description.as_deref())
                    .unwrap_or("");
                let file = source
                    .file
                    .as_ref()
                    .map(|f| f.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    source.id.clone(),
                    source.title.clone(),
                    source.enabled.to_string(),
                    file,
                    about.to_string(),
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}

async fn run_sync(
    config: Option<&Path>,
    enable: Vec<String>,
    hide_proposed: bool,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let ids = if enable.is_empty() {
        config.enabled_ids()
    } else {
        enable
    };

    let mut session = GraphSession::from_config(&config);
    session.select_sources(ids).await;
    if let Some(summary) = session.settle().await {
        eprintln!(
            "{} sources, {} failed, {} merges",
            summary.completed, summary.failed, summary.merges
        );
    }

    let mut filter: GraphFilter = config.filter.clone();
    if hide_proposed {
        filter.set_show_proposed_edges(false);
    }

    let store = session.store();
    let store = store.read().await;
    filter.ensure_node_types(store.nodes().map(|n| n.kind().to_string()));
    let graph = RenderGraph::visible(&store, &filter);
    print_graph(&graph, format)
}

async fn run_layout(
    input: &Path,
    bow_step: Option<f64>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(input).await?;
    let raw: RawGraph = serde_json::from_slice(&bytes)?;
    let candidate = resolve_sources([&raw]);

    let mut store = LiveGraphStore::new();
    let report = MergeEngine::new().merge(&mut store, &candidate);
    let layout = bow_step.map(MultiEdgeLayout::new).unwrap_or_default();
    let groups = layout.apply(&mut store);
    eprintln!(
        "{} nodes, {} edges ({} dropped), {} multi-edge groups",
        store.node_count(),
        store.edge_count(),
        report.edges_dropped,
        groups
    );

    print_graph(&RenderGraph::full(&store), format)
}

fn print_graph(graph: &RenderGraph, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(graph)?);
        }
        OutputFormat::Table => {
            let mut nodes = Table::new();
            nodes.set_content_arrangement(ContentArrangement::Dynamic);
            nodes.set_header(vec!["id", "name", "type"]);
            for node in &graph.nodes {
                nodes.add_row(vec![node.id.clone(), node.name.clone(), node.kind.to_string()]);
            }
            println!("{}", nodes);
            println!("{} node(s)", graph.nodes.len());

            if graph.links.is_empty() {
                return Ok(());
            }

            let mut links = Table::new();
            links.set_content_arrangement(ContentArrangement::Dynamic);
            links.set_header(vec!["source", "type", "target", "curvature", "rotation", "multi"]);
            for link in &graph.links {
                let proposed = if link.proposed { " (proposed)" } else { "" };
                links.add_row(vec![
                    link.source_id.clone(),
                    format!("{}{}", link.edge_type, proposed),
                    link.target_id.clone(),
                    format!("{:.3}", link.curvature),
                    format!("{:.3}", link.curve_rotation),
                    format!("{}/{}", link.multi_index + 1, link.multi_count),
                ]);
            }
            println!("{}", links);
            println!("{} link(s)", graph.links.len());
        }
    }

    Ok(())
}
