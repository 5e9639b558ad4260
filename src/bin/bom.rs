use bomgraph::ingest::build_graph;
use bomgraph::traverse::{derive_tooltip, resolve_entrypoint, TraversalEngine};
use bomgraph::Config;
use clap::Parser;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "bom")]
#[command(about = "Run a one-shot BOM traversal against the configured graph source")]
struct Args {
    /// Entrypoint term: an identifier, a bare local name, or a property value
    entrypoint: String,

    /// Maximum traversal depth in hops
    #[arg(short, long, default_value_t = 2)]
    depth: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load()?;
    if args.depth > config.traversal.max_depth_limit {
        anyhow::bail!(
            "depth {} exceeds traversal.max_depth_limit {}",
            args.depth,
            config.traversal.max_depth_limit
        );
    }

    // Build the graph from the configured source
    let (graph, summary) = build_graph(&config).await?;
    if summary.failure_count > 0 {
        log::warn!(
            "{} of {} source record(s) failed to ingest",
            summary.failure_count,
            summary.input_count
        );
    }

    // Measure traversal latency
    let start = Instant::now();
    let seeds = resolve_entrypoint(
        &graph,
        &args.entrypoint,
        &config.graph.namespace,
        config.traversal.search_limit,
    )?;
    let outcome = TraversalEngine::new(&graph, config.traversal.neighbor_limit)
        .traverse(&seeds, args.depth);
    let duration = start.elapsed();

    // Display results
    println!("\n╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║ BomGraph Traversal Results                                                   ║");
    println!("╚══════════════════════════════════════════════════════════════════════════════╝");
    println!("\nEntrypoint: \"{}\"\n", args.entrypoint);

    if outcome.nodes.is_empty() {
        println!("No nodes discovered.");
    } else {
        let mut nodes: Vec<_> = outcome.nodes.values().collect();
        nodes.sort_by(|a, b| a.depth.cmp(&b.depth).then(a.identifier.cmp(&b.identifier)));
        for node in nodes {
            println!("─────────────────────────────────────────────────────────────────────────────");
            println!(
                "Depth {}: {} ({})",
                node.depth, node.display_name, node.identifier
            );
            if !node.visited {
                println!("(frontier, not expanded)");
            } else {
                for line in derive_tooltip(&node.self_properties, &node.identifier).lines() {
                    println!("  {}", line);
                }
            }
            for conn in &node.connections {
                println!("  {} {}", conn.edge_label, conn.target);
            }
        }
        println!("─────────────────────────────────────────────────────────────────────────────");
    }

    // Display traversal statistics
    println!("\n╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║ Traversal Statistics                                                         ║");
    println!("╚══════════════════════════════════════════════════════════════════════════════╝");
    println!("Nodes discovered: {}", outcome.nodes.len());
    println!("Actual depth: {}", outcome.actual_depth);
    println!("Failed fetches: {}", outcome.failed_fetches);
    println!("Latency: {:?}", duration);

    Ok(())
}
