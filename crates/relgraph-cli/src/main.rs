use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relgraph_core::{NodeKind, PresentationGraph, RawGraph};
use relgraph_graph::{
    ForceConfig, GraphStats, GraphTransformer, KindFilter, LayoutEngine, LimitReport, NodeLimiter,
    Viewport,
};
use relgraph_view::ViewSettings;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Lay out a relationship graph payload", long_about = None)]
struct Args {
    /// Relationship payload (JSON). Reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum nodes to keep; defaults to the configured node limit
    #[arg(short, long)]
    limit: Option<usize>,

    /// Tick budget for the layout
    #[arg(long, default_value_t = 1000)]
    ticks: usize,

    #[arg(long, default_value_t = 800.0)]
    width: f32,

    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Override the payload's center entity
    #[arg(long)]
    center: Option<String>,

    /// Node kinds to hide
    #[arg(long, value_parser = parse_kind, num_args = 1..)]
    hide: Vec<NodeKind>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Settings file; defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_kind(value: &str) -> std::result::Result<NodeKind, String> {
    value.parse().map_err(|e: relgraph_core::Error| e.to_string())
}

#[derive(Serialize)]
struct LayoutOutput {
    report: LimitReport,
    ticks: usize,
    settled: bool,
    graph: PresentationGraph,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relgraph=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => ViewSettings::load_from(path)?,
        None => ViewSettings::load(),
    };

    let mut raw = read_payload(args.input.as_ref())?;
    if let Some(center) = &args.center {
        raw.center = Some(center.clone());
    }

    let graph = GraphTransformer::transform(&raw);
    let graph = KindFilter::hiding(args.hide.iter().copied()).apply(&graph);
    let (graph, report) = NodeLimiter::limit(graph, args.limit.unwrap_or(settings.node_limit));

    let viewport = Viewport::new(args.width, args.height);
    let (engine, ticks) = run_layout(&graph, settings.forces, viewport, args.ticks);
    let settled = !engine.is_running();

    match args.format {
        OutputFormat::Summary => print_summary(&graph, &report, ticks, settled),
        OutputFormat::Json => {
            let output = LayoutOutput {
                report,
                ticks,
                settled,
                graph: engine.snapshot(&graph),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_payload(input: Option<&PathBuf>) -> Result<RawGraph> {
    let raw = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            RawGraph::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => RawGraph::from_reader(std::io::stdin().lock())
            .context("failed to parse payload from stdin")?,
    };
    tracing::info!(
        "Read {} raw nodes and {} relationships",
        raw.nodes.len(),
        raw.relationships.len()
    );
    Ok(raw)
}

fn run_layout(
    graph: &PresentationGraph,
    forces: ForceConfig,
    viewport: Viewport,
    max_ticks: usize,
) -> (LayoutEngine, usize) {
    let mut engine = LayoutEngine::new(graph, forces, viewport.center());
    let ticks = engine.run(max_ticks);
    (engine, ticks)
}

fn print_summary(graph: &PresentationGraph, report: &LimitReport, ticks: usize, settled: bool) {
    let stats = GraphStats::from_graph(graph);

    println!("Nodes: {}", stats.total_nodes);
    for (kind, count) in &stats.nodes_by_kind {
        println!("  {:<12} {}", kind, count);
    }
    println!("Links: {}", stats.total_links);
    for (kind, count) in &stats.links_by_kind {
        println!("  {:<12} {}", kind, count);
    }
    if report.is_limited {
        println!(
            "Limited: kept {} of {} nodes ({} dropped)",
            report.retained_count,
            report.original_count,
            report.dropped_count()
        );
    }
    if let Some(center) = &graph.center {
        println!("Center: {}", center);
    }
    if settled {
        println!("Layout settled after {} ticks", ticks);
    } else {
        println!("Layout still running after {} ticks", ticks);
    }
}
