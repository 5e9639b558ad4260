use thiserror::Error;

/// Main error type for BomGraph
#[derive(Error, Debug)]
pub enum BomGraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed source document payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote graph source fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A single node's backend query failed
    #[error("Backend query failure: {0}")]
    Backend(String),

    /// A single source record could not be ingested
    #[error("Ingestion record failure: {0}")]
    Ingest(String),

    /// A graph reload was requested while another is active
    #[error("Graph reload already in progress")]
    ReloadInProgress,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using BomGraphError
pub type Result<T> = std::result::Result<T, BomGraphError>;
