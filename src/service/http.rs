//! Axum transport for the graph service.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{BomGraphError, Result};
use crate::graph::GraphHandle;
use crate::ingest::{build_graph, ingest_batch};
use crate::service::types::*;
use crate::service::AppState;
use crate::traverse::{resolve_entrypoint, TraversalEngine};

/// Check if a port is available by attempting to bind to it
async fn check_port_available(port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .is_ok()
}

/// HTTP graph service wrapper
pub struct GraphHttpServer {
    state: Arc<AppState>,
}

impl GraphHttpServer {
    pub fn new(graph: GraphHandle, config: Config) -> Self {
        Self {
            state: Arc::new(AppState::new(graph, config)),
        }
    }

    /// Run the HTTP server
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting graph service on http://{}", addr);
        log::info!("BOM endpoint: http://{}/bom_query", addr);

        if !check_port_available(port).await {
            return Err(BomGraphError::Config(format!(
                "Port {} is already in use. Another process (possibly a previous bomgraph \
                 instance) is using this port. Stop it or set http_server.port in config.toml.",
                port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                BomGraphError::Io(std::io::Error::new(
                    std::io::ErrorKind::AddrInUse,
                    format!("Failed to bind to {}: {}", addr, e),
                ))
            })?;

        axum::serve(listener, app).await.map_err(|e| {
            BomGraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    fn create_router(&self) -> Router {
        let allowed_origins = &self.state.config.http_server.allowed_origins;

        // Build CORS layer: restrict to configured origins, or allow all for
        // local development when none are configured.
        let cors = if allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/bom_query", post(handle_bom_query))
            .route("/add_documents", post(handle_add_documents))
            .route("/reload", post(handle_reload))
            .route("/health", get(handle_health))
            .route("/ping", get(handle_ping))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(Arc::clone(&self.state))
    }
}

/// Resolve the entrypoint and run the bounded traversal under the graph lock.
async fn handle_bom_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BomQueryRequest>,
) -> Response {
    let depth_limit = state.config.traversal.max_depth_limit;
    if request.max_depth > depth_limit {
        let err = BomGraphError::InvalidInput(format!(
            "max_depth {} exceeds limit {}",
            request.max_depth, depth_limit
        ));
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response();
    }

    log::info!(
        "bom_query: entrypoint={} max_depth={}",
        request.entrypoint,
        request.max_depth
    );
    let start = Instant::now();
    let entrypoint = request.entrypoint.clone();
    let namespace = state.config.graph.namespace.clone();
    let search_limit = state.config.traversal.search_limit;
    let neighbor_limit = state.config.traversal.neighbor_limit;
    let max_depth = request.max_depth;

    let outcome = state
        .graph
        .with_graph(move |g| {
            let seeds = resolve_entrypoint(&*g, &entrypoint, &namespace, search_limit)?;
            Ok(TraversalEngine::new(&*g, neighbor_limit).traverse(&seeds, max_depth))
        })
        .await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(outcome) => {
            state.record_query_success();
            Json(BomQueryResponse {
                entrypoint: request.entrypoint,
                max_depth: request.max_depth,
                actual_depth: outcome.actual_depth,
                nodes: outcome.nodes,
                error: None,
                elapsed_ms,
            })
            .into_response()
        }
        Err(e) => {
            state.record_query_failure();
            log::error!("bom_query failed: {}", e);
            Json(BomQueryResponse {
                entrypoint: request.entrypoint,
                max_depth: request.max_depth,
                actual_depth: 0,
                nodes: Default::default(),
                error: Some(e.to_string()),
                elapsed_ms,
            })
            .into_response()
        }
    }
}

/// Incremental ingestion from the source change feed.
async fn handle_add_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddDocumentsRequest>,
) -> Response {
    let start = Instant::now();
    let settings = state.config.ingest.clone();
    let documents = request.documents;
    log::info!("add_documents: {} document(s)", documents.len());

    let summary = state
        .graph
        .with_graph(move |g| Ok(ingest_batch(g, &settings, &documents)))
        .await;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match summary {
        Ok(summary) => Json(AddDocumentsResponse {
            input_count: summary.input_count,
            processed_count: summary.processed_count,
            failure_count: summary.failure_count,
            first_error: summary.first_error,
            elapsed_ms,
        })
        .into_response(),
        Err(e) => {
            log::error!("add_documents failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Rebuild the graph from the configured source and swap it in atomically.
/// A concurrent reload is rejected, not queued.
async fn handle_reload(State(state): State<Arc<AppState>>) -> Response {
    if state
        .reload_in_progress
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": BomGraphError::ReloadInProgress.to_string()
            })),
        )
            .into_response();
    }

    log::info!("reload requested");
    let start = Instant::now();
    let result = build_graph(&state.config).await;
    state.reload_in_progress.store(false, Ordering::SeqCst);

    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok((graph, summary)) => {
            let document_count = graph.docs_loaded();
            state.graph.replace(graph);
            log::info!(
                "reload complete: {} document(s), {} failed, {}ms",
                document_count,
                summary.failure_count,
                elapsed_ms
            );
            Json(ReloadResponse {
                document_count,
                elapsed_ms,
            })
            .into_response()
        }
        Err(e) => {
            log::error!("reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    let counts = state
        .graph
        .with_graph(|g| Ok((g.node_count(), g.triple_count(), g.docs_loaded())))
        .await;

    match counts {
        Ok((node_count, triple_count, docs_loaded)) => Json(HealthResponse {
            status: "up".to_string(),
            node_count,
            triple_count,
            docs_loaded,
            successful_queries: state.successful_queries.load(Ordering::Relaxed),
            unsuccessful_queries: state.unsuccessful_queries.load(Ordering::Relaxed),
            last_successful_query: state.last_successful_query(),
            uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"status": "down", "error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn handle_ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
        epoch_ms: chrono::Utc::now().timestamp_millis(),
    })
}
