mod app;
mod graph;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::SimulationConfig;
use crate::graph::{DEFAULT_SUMMARY_CHARS, GraphStats, GraphSummary, build_session};

/// Explore knowledge graphs extracted from documents, fused into one view.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Extracted graph JSON files, one per document.
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Iterations the layout runs before it settles.
    #[arg(long, default_value_t = SimulationConfig::default().max_iterations)]
    max_iterations: usize,

    /// Fuse the documents, print the bounded graph summary as JSON and exit.
    #[arg(long)]
    print_summary: bool,

    /// Character bound for the printed summary.
    #[arg(long, default_value_t = DEFAULT_SUMMARY_CHARS)]
    summary_limit: usize,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_summary(args: &Args) -> Result<()> {
    let session = build_session(&args.documents)?;
    let stats = GraphStats::compute(&session.graph);
    info!(
        nodes = stats.node_count,
        edges = stats.edge_count,
        cross_document_edges = stats.cross_document_edges,
        orphans = stats.orphan_count,
        average_degree = stats.average_degree,
        "graph summary"
    );

    let json = GraphSummary::project(&session.graph)
        .to_bounded_json(args.summary_limit)
        .context("failed to serialize graph summary")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.print_summary {
        return print_summary(&args);
    }

    let config = SimulationConfig {
        max_iterations: args.max_iterations.max(1),
        ..SimulationConfig::default()
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "xplor",
        options,
        Box::new(move |cc| Ok(Box::new(app::XplorApp::new(cc, args.documents, config)))),
    )
    .map_err(|error| anyhow!("failed to start the explorer window: {error}"))
}
