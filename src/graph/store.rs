//! Reference in-memory triple store implementing the query-backend contract.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::graph::{is_schema_predicate, EdgeBinding, EdgeDirection, QueryBackend, Term};

/// The in-memory application graph.
///
/// Triples are held in a subject-indexed map plus an object-side index so
/// both edge directions enumerate without a scan. Insertion is append-only
/// with set semantics: re-adding an identical triple is a no-op, so
/// re-ingesting a source record cannot change the observable graph state.
#[derive(Debug)]
pub struct MemoryGraph {
    namespace: String,
    /// subject -> (predicate, object)
    outbound: HashMap<String, Vec<(String, Term)>>,
    /// object -> (predicate, subject), IRI objects only
    inbound: HashMap<String, Vec<(String, String)>>,
    triples: usize,
    docs_loaded: u64,
}

impl MemoryGraph {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            outbound: HashMap::new(),
            inbound: HashMap::new(),
            triples: 0,
            docs_loaded: 0,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Add one triple. Identical triples collapse; distinct triples on the
    /// same subject append.
    pub fn insert_triple(&mut self, subject: &str, predicate: &str, object: Term) {
        let entries = self.outbound.entry(subject.to_string()).or_default();
        if entries
            .iter()
            .any(|(p, o)| p == predicate && *o == object)
        {
            return;
        }
        if let Term::Iri(ref target) = object {
            self.inbound
                .entry(target.clone())
                .or_default()
                .push((predicate.to_string(), subject.to_string()));
        }
        entries.push((predicate.to_string(), object));
        self.triples += 1;
    }

    /// Ensure a node is known to the graph even before any property or edge
    /// references it.
    pub fn touch_node(&mut self, identifier: &str) {
        self.outbound.entry(identifier.to_string()).or_default();
    }

    pub fn triple_count(&self) -> usize {
        self.triples
    }

    /// Distinct identifiers appearing in subject or object position.
    pub fn node_count(&self) -> usize {
        let mut nodes: HashSet<&str> = self.outbound.keys().map(String::as_str).collect();
        nodes.extend(self.inbound.keys().map(String::as_str));
        nodes.len()
    }

    pub fn docs_loaded(&self) -> u64 {
        self.docs_loaded
    }

    pub fn record_doc_loaded(&mut self) {
        self.docs_loaded += 1;
    }
}

impl QueryBackend for MemoryGraph {
    fn exists(&self, identifier: &str) -> Result<bool> {
        Ok(self.outbound.contains_key(identifier) || self.inbound.contains_key(identifier))
    }

    fn properties_of(&self, identifier: &str) -> Result<Vec<(String, Term)>> {
        let mut props = Vec::new();
        if let Some(entries) = self.outbound.get(identifier) {
            for (predicate, object) in entries {
                if is_schema_predicate(predicate) {
                    continue;
                }
                props.push((predicate.clone(), object.clone()));
            }
        }
        Ok(props)
    }

    fn generic_edges_of(&self, identifier: &str, limit: usize) -> Result<Vec<EdgeBinding>> {
        let mut edges = Vec::new();
        if let Some(entries) = self.outbound.get(identifier) {
            for (predicate, object) in entries {
                if edges.len() >= limit {
                    return Ok(edges);
                }
                if is_schema_predicate(predicate) {
                    continue;
                }
                if let Term::Iri(target) = object {
                    edges.push(EdgeBinding {
                        predicate: predicate.clone(),
                        neighbor: target.clone(),
                        direction: EdgeDirection::Outbound,
                    });
                }
            }
        }
        if let Some(entries) = self.inbound.get(identifier) {
            for (predicate, source) in entries {
                if edges.len() >= limit {
                    break;
                }
                if is_schema_predicate(predicate) {
                    continue;
                }
                edges.push(EdgeBinding {
                    predicate: predicate.clone(),
                    neighbor: source.clone(),
                    direction: EdgeDirection::Inbound,
                });
            }
        }
        Ok(edges)
    }

    fn literal_search(&self, term: &str, limit: usize) -> Result<Vec<String>> {
        let needle = term.to_lowercase();
        let mut matches = Vec::new();
        for (subject, entries) in &self.outbound {
            if matches.len() >= limit {
                break;
            }
            let hit = entries.iter().any(|(_, object)| match object {
                Term::Literal(value) => value.to_lowercase().contains(&needle),
                Term::Iri(_) => false,
            });
            if hit {
                matches.push(subject.clone());
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TYPE_PREDICATE;

    fn sample_graph() -> MemoryGraph {
        let ns = "http://example.com/graph#";
        let mut g = MemoryGraph::new(ns);
        let flask = format!("{}flask", ns);
        let jinja = format!("{}jinja2", ns);
        g.insert_triple(&flask, TYPE_PREDICATE, Term::Iri(format!("{}Library", ns)));
        g.insert_triple(
            &flask,
            &format!("{}name", ns),
            Term::Literal("flask".to_string()),
        );
        g.insert_triple(
            &flask,
            &format!("{}release_count", ns),
            Term::Literal("57".to_string()),
        );
        g.insert_triple(
            &flask,
            &format!("{}uses_library", ns),
            Term::Iri(jinja.clone()),
        );
        g.insert_triple(
            &jinja,
            &format!("{}used_by_library", ns),
            Term::Iri(flask),
        );
        g.insert_triple(
            &jinja,
            &format!("{}name", ns),
            Term::Literal("jinja2".to_string()),
        );
        g
    }

    #[test]
    fn test_exists() {
        let g = sample_graph();
        assert!(g.exists("http://example.com/graph#flask").unwrap());
        assert!(g.exists("http://example.com/graph#jinja2").unwrap());
        assert!(!g.exists("http://example.com/graph#nope").unwrap());
    }

    #[test]
    fn test_properties_exclude_type() {
        let g = sample_graph();
        let props = g.properties_of("http://example.com/graph#flask").unwrap();
        assert!(props.iter().all(|(p, _)| p != TYPE_PREDICATE));
        assert!(props
            .iter()
            .any(|(p, v)| p.ends_with("#name") && v.as_str() == "flask"));
    }

    #[test]
    fn test_generic_edges_both_directions() {
        let g = sample_graph();
        let edges = g
            .generic_edges_of("http://example.com/graph#jinja2", 40)
            .unwrap();
        // outbound used_by_library edge plus the inbound side of uses_library
        assert_eq!(edges.len(), 2);
        assert!(edges
            .iter()
            .any(|e| e.direction == EdgeDirection::Outbound
                && e.neighbor == "http://example.com/graph#flask"));
        assert!(edges
            .iter()
            .any(|e| e.direction == EdgeDirection::Inbound
                && e.neighbor == "http://example.com/graph#flask"));
    }

    #[test]
    fn test_generic_edges_respect_limit() {
        let ns = "http://example.com/graph#";
        let mut g = MemoryGraph::new(ns);
        let hub = format!("{}hub", ns);
        for i in 0..10 {
            g.insert_triple(
                &hub,
                &format!("{}uses_library", ns),
                Term::Iri(format!("{}dep{}", ns, i)),
            );
        }
        let edges = g.generic_edges_of(&hub, 3).unwrap();
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn test_literal_search_case_insensitive() {
        let g = sample_graph();
        let hits = g.literal_search("FLA", 25).unwrap();
        assert_eq!(hits, vec!["http://example.com/graph#flask".to_string()]);
    }

    #[test]
    fn test_literal_search_bounded() {
        let ns = "http://example.com/graph#";
        let mut g = MemoryGraph::new(ns);
        for i in 0..30 {
            g.insert_triple(
                &format!("{}lib{}", ns, i),
                &format!("{}kwds", ns),
                Term::Literal("web framework".to_string()),
            );
        }
        let hits = g.literal_search("framework", 5).unwrap();
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn test_duplicate_triple_collapses() {
        let ns = "http://example.com/graph#";
        let mut g = MemoryGraph::new(ns);
        let a = format!("{}a", ns);
        let pred = format!("{}uses_library", ns);
        g.insert_triple(&a, &pred, Term::Iri(format!("{}b", ns)));
        let before = g.triple_count();
        g.insert_triple(&a, &pred, Term::Iri(format!("{}b", ns)));
        assert_eq!(g.triple_count(), before);
        let edges = g.generic_edges_of(&a, 40).unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_node_count_includes_object_only_nodes() {
        let ns = "http://example.com/graph#";
        let mut g = MemoryGraph::new(ns);
        g.insert_triple(
            &format!("{}a", ns),
            &format!("{}uses_library", ns),
            Term::Iri(format!("{}b", ns)),
        );
        assert_eq!(g.node_count(), 2);
    }
}
