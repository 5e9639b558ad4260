//! HTTP service surface over the graph core.

pub mod http;
pub mod types;

pub use http::GraphHttpServer;

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use crate::config::Config;
use crate::graph::GraphHandle;

/// Application state shared across handlers.
///
/// Query counters live for the process, across graph reloads, matching the
/// health surface of the original service.
pub struct AppState {
    pub graph: GraphHandle,
    pub config: Config,
    pub reload_in_progress: AtomicBool,
    pub successful_queries: AtomicU64,
    pub unsuccessful_queries: AtomicU64,
    last_successful_query_ms: AtomicI64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(graph: GraphHandle, config: Config) -> Self {
        Self {
            graph,
            config,
            reload_in_progress: AtomicBool::new(false),
            successful_queries: AtomicU64::new(0),
            unsuccessful_queries: AtomicU64::new(0),
            last_successful_query_ms: AtomicI64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn record_query_success(&self) {
        self.successful_queries.fetch_add(1, Ordering::Relaxed);
        self.last_successful_query_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn record_query_failure(&self) {
        self.unsuccessful_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// RFC 3339 timestamp of the last successful query, if any.
    pub fn last_successful_query(&self) -> Option<String> {
        let millis = self.last_successful_query_ms.load(Ordering::Relaxed);
        if millis == 0 {
            return None;
        }
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|t| t.to_rfc3339())
    }
}
