//! Depth-bounded, breadth-first neighborhood expansion.

use std::collections::HashMap;

use crate::error::Result;
use crate::graph::{uri, QueryBackend};
use crate::traverse::{enrich, NodeMap, PropertyBag, RichConnection, TraversedNode};

/// Result of one traversal session.
#[derive(Debug)]
pub struct TraversalOutcome {
    /// Discovered nodes keyed by absolute identifier.
    pub nodes: NodeMap,
    /// Maximum first-discovery depth across the node map.
    pub actual_depth: u32,
    /// Neighborhood fetches that failed and were skipped.
    pub failed_fetches: u64,
}

/// The bounded expansion loop.
///
/// Relationship types are discovered from the backend at runtime; nothing
/// about the schema is known up front. Each pass expands every node still in
/// the frontier, inserting newly seen neighbors at the current loop depth.
/// The loop stops when the depth bound is exceeded or a pass adds no nodes.
pub struct TraversalEngine<'a, B: QueryBackend> {
    backend: &'a B,
    neighbor_limit: usize,
}

struct Expansion {
    properties: PropertyBag,
    connections: Vec<RichConnection>,
}

impl<'a, B: QueryBackend> TraversalEngine<'a, B> {
    pub fn new(backend: &'a B, neighbor_limit: usize) -> Self {
        Self {
            backend,
            neighbor_limit,
        }
    }

    /// Expand from `seeds` up to `max_depth` hops.
    ///
    /// A node's depth is assigned when it first enters the map and is never
    /// revised by a later path. A failed neighborhood fetch leaves its node
    /// visited with no connections and does not abort the pass.
    pub fn traverse(&self, seeds: &[String], max_depth: u32) -> TraversalOutcome {
        let mut nodes: NodeMap = HashMap::new();
        for seed in seeds {
            nodes
                .entry(seed.clone())
                .or_insert_with(|| TraversedNode::new(seed.clone(), 0));
        }

        let mut failed_fetches = 0u64;
        let mut loop_depth = 0u32;
        loop {
            loop_depth += 1;
            if loop_depth > max_depth {
                break;
            }
            let count_at_pass_start = nodes.len();
            let frontier: Vec<String> = nodes
                .iter()
                .filter(|(_, node)| !node.visited)
                .map(|(id, _)| id.clone())
                .collect();

            for identifier in frontier {
                match self.expand(&identifier) {
                    Ok(expansion) => {
                        for connection in &expansion.connections {
                            if !nodes.contains_key(&connection.target) {
                                nodes.insert(
                                    connection.target.clone(),
                                    TraversedNode::new(connection.target.clone(), loop_depth),
                                );
                            }
                        }
                        if let Some(node) = nodes.get_mut(&identifier) {
                            node.visited = true;
                            node.display_name =
                                enrich::derive_display_label(&expansion.properties, &identifier);
                            node.self_properties = expansion.properties;
                            node.connections = expansion.connections;
                        }
                    }
                    Err(e) => {
                        failed_fetches += 1;
                        log::warn!("neighborhood fetch failed for {}: {}", identifier, e);
                        if let Some(node) = nodes.get_mut(&identifier) {
                            node.visited = true;
                        }
                    }
                }
            }

            log::debug!(
                "traversal pass {}: {} node(s), {} failure(s)",
                loop_depth,
                nodes.len(),
                failed_fetches
            );
            if nodes.len() == count_at_pass_start {
                break;
            }
        }

        let actual_depth = nodes.values().map(|n| n.depth).max().unwrap_or(0);
        TraversalOutcome {
            nodes,
            actual_depth,
            failed_fetches,
        }
    }

    fn expand(&self, identifier: &str) -> Result<Expansion> {
        let properties = enrich::fetch_properties(self.backend, identifier)?;
        let edges = self.backend.generic_edges_of(identifier, self.neighbor_limit)?;
        let mut connections = Vec::with_capacity(edges.len());
        for edge in edges {
            // a neighbor whose own enrichment fails still yields a connection
            let target_properties =
                enrich::fetch_properties(self.backend, &edge.neighbor).unwrap_or_default();
            let predicate = uri::local_name(&edge.predicate).to_string();
            let edge_label =
                enrich::derive_edge_label(&target_properties, &predicate, edge.direction);
            connections.push(RichConnection {
                target: edge.neighbor,
                predicate,
                direction: edge.direction,
                properties: target_properties,
                edge_label,
            });
        }
        Ok(Expansion {
            properties,
            connections,
        })
    }
}
