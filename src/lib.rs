pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod service;
pub mod traverse;

pub use config::Config;
pub use error::{BomGraphError, Result};
pub use graph::{GraphHandle, MemoryGraph, QueryBackend};
pub use traverse::{resolve_entrypoint, TraversalEngine, TraversalOutcome};
