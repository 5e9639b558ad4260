//! Document-to-graph ingestion: per-record triples building, batch
//! processing, and graph construction from the configured source.

pub mod loader;
pub mod triples;

pub use loader::build_graph;
pub use triples::TriplesBuilder;

use serde::Serialize;
use serde_json::Value;

use crate::config::IngestConfig;
use crate::graph::MemoryGraph;

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub input_count: usize,
    pub processed_count: usize,
    pub failure_count: usize,
    pub first_error: Option<String>,
}

/// Ingest a batch of flat source records.
///
/// A failed record is counted and logged; the batch continues. The first
/// error message is retained for the response summary.
pub fn ingest_batch(
    graph: &mut MemoryGraph,
    settings: &IngestConfig,
    documents: &[Value],
) -> BatchSummary {
    let mut summary = BatchSummary {
        input_count: documents.len(),
        processed_count: 0,
        failure_count: 0,
        first_error: None,
    };
    let mut builder = TriplesBuilder::new(graph, settings);
    for doc in documents {
        match builder.ingest_document(doc) {
            Ok(()) => summary.processed_count += 1,
            Err(e) => {
                summary.failure_count += 1;
                log::warn!("record ingestion failed: {}", e);
                if summary.first_error.is_none() {
                    summary.first_error = Some(e.to_string());
                }
            }
        }
    }
    summary
}
