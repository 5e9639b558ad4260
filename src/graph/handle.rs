//! Shared ownership of the live graph under a single coarse lock.

use std::sync::{Arc, Mutex};
use tokio::task;

use crate::error::{BomGraphError, Result};
use crate::graph::MemoryGraph;

/// Process-wide handle to the live graph.
///
/// Every reader or writer goes through [`GraphHandle::with_graph`], which
/// runs the closure on a blocking thread while holding the one lock — at most
/// one logical reader-or-writer at a time, so a traversal or bulk ingest
/// always observes a consistent graph. Reload builds a replacement graph
/// off-lock and installs it with [`GraphHandle::replace`].
#[derive(Clone)]
pub struct GraphHandle {
    inner: Arc<Mutex<MemoryGraph>>,
}

impl GraphHandle {
    pub fn new(graph: MemoryGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Execute a closure against the live graph in a blocking task.
    pub async fn with_graph<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MemoryGraph) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.inner);
        task::spawn_blocking(move || {
            // A poisoned lock only means a previous closure panicked; the
            // graph itself is append-only and still usable.
            let mut guard = match shared.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut *guard)
        })
        .await
        .map_err(|e| BomGraphError::Backend(format!("graph task failed: {}", e)))?
    }

    /// Atomically swap in a freshly built graph.
    pub fn replace(&self, new_graph: MemoryGraph) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = new_graph;
    }
}
