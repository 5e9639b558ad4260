use anyhow::Result;
use bomgraph::graph::GraphHandle;
use bomgraph::ingest::build_graph;
use bomgraph::service::GraphHttpServer;
use bomgraph::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "info"),
    )
    .init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("check");

    match command {
        "serve" => {
            run_server().await?;
        }
        "load" => {
            run_load().await?;
        }
        "check" | _ => {
            run_check().await?;
        }
    }

    Ok(())
}

/// Build the graph and serve it over HTTP
async fn run_server() -> Result<()> {
    log::info!("Starting BomGraph service v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Configuration loaded successfully");
    log::info!("Namespace: {}", config.graph.namespace);
    log::info!("Graph source: {}", config.graph.source);

    let (graph, summary) = build_graph(&config).await?;
    if summary.failure_count > 0 {
        log::warn!(
            "{} of {} source record(s) failed to ingest",
            summary.failure_count,
            summary.input_count
        );
    }

    let handle = GraphHandle::new(graph);
    let server = GraphHttpServer::new(handle, config.clone());
    server.run(config.http_server.port).await?;

    Ok(())
}

/// Build the graph once and report what was loaded
async fn run_load() -> Result<()> {
    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    let (graph, summary) = build_graph(&config).await?;
    log::info!(
        "Load complete: {} node(s), {} triple(s)",
        graph.node_count(),
        graph.triple_count()
    );
    log::info!(
        "Records: {} input, {} processed, {} failed",
        summary.input_count,
        summary.processed_count,
        summary.failure_count
    );
    if let Some(first_error) = summary.first_error {
        log::warn!("First record error: {}", first_error);
    }

    Ok(())
}

/// Validate configuration without building the graph
async fn run_check() -> Result<()> {
    log::info!("Starting BomGraph v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Configuration valid");
    log::info!("Namespace: {}", config.graph.namespace);
    log::info!("Graph source: {}", config.graph.source);
    log::info!("Traversal depth limit: {}", config.traversal.max_depth_limit);
    log::info!("HTTP port: {}", config.http_server.port);

    Ok(())
}
