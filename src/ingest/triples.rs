//! Flat source record -> graph triples.

use serde_json::Value;

use crate::config::IngestConfig;
use crate::error::{BomGraphError, Result};
use crate::graph::{uri, MemoryGraph, Term, TYPE_PREDICATE};

/// Converts one source document into node, property, and edge insertions.
///
/// One document usually produces several triples; it is not a 1:1 ratio. The
/// subject comes from the configured id attribute; every array-valued
/// attribute is treated as a relationship list and written in both
/// directions so the graph is navigable without a second pass.
pub struct TriplesBuilder<'a> {
    graph: &'a mut MemoryGraph,
    settings: &'a IngestConfig,
    documents_ingested: u64,
}

impl<'a> TriplesBuilder<'a> {
    pub fn new(graph: &'a mut MemoryGraph, settings: &'a IngestConfig) -> Self {
        Self {
            graph,
            settings,
            documents_ingested: 0,
        }
    }

    pub fn documents_ingested(&self) -> u64 {
        self.documents_ingested
    }

    /// Ingest a single record, mutating the graph. Errors describe the
    /// record's defect and leave the rest of the batch unaffected.
    pub fn ingest_document(&mut self, doc: &Value) -> Result<()> {
        let record = doc.as_object().ok_or_else(|| {
            BomGraphError::Ingest("source record is not a JSON object".to_string())
        })?;

        let raw_id = record
            .get(&self.settings.id_attribute)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BomGraphError::Ingest(format!(
                    "record missing id attribute '{}'",
                    self.settings.id_attribute
                ))
            })?;
        let local = self.reference_local_name(raw_id);
        if local.is_empty() {
            return Err(BomGraphError::Ingest(format!(
                "record id attribute '{}' is blank",
                self.settings.id_attribute
            )));
        }

        let namespace = self.graph.namespace().to_string();
        let subject = uri::normalize(&local, &namespace);
        self.graph.touch_node(&subject);
        let type_uri = uri::normalize(&self.settings.type_name, &namespace);
        self.graph
            .insert_triple(&subject, TYPE_PREDICATE, Term::Iri(type_uri));

        for (key, value) in record {
            if key == &self.settings.id_attribute {
                continue;
            }
            // other underscore attributes are store bookkeeping, not data
            if key.starts_with('_') {
                continue;
            }
            match value {
                Value::Null => continue,
                Value::Array(items) => {
                    self.ingest_relationships(&subject, key, items, &namespace)?
                }
                Value::String(text) => {
                    self.ingest_scalar(&subject, key, text, &namespace);
                }
                Value::Number(number) => {
                    self.ingest_scalar(&subject, key, &number.to_string(), &namespace);
                }
                Value::Bool(flag) => {
                    self.ingest_scalar(&subject, key, &flag.to_string(), &namespace);
                }
                Value::Object(_) => {
                    return Err(BomGraphError::Ingest(format!(
                        "unexpected nested value in attribute '{}'",
                        key
                    )));
                }
            }
        }

        self.documents_ingested += 1;
        self.graph.record_doc_loaded();
        if self.documents_ingested % 1000 == 0 {
            log::info!("ingested {} documents, latest: {}", self.documents_ingested, local);
        }
        Ok(())
    }

    fn ingest_scalar(&mut self, subject: &str, attr: &str, raw: &str, namespace: &str) {
        let trimmed = raw.trim();
        let stored = if self
            .settings
            .lowercase_attributes
            .iter()
            .any(|a| a == attr)
        {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        let predicate = uri::normalize(attr, namespace);
        self.graph
            .insert_triple(subject, &predicate, Term::Literal(stored));
    }

    fn ingest_relationships(
        &mut self,
        subject: &str,
        attr: &str,
        items: &[Value],
        namespace: &str,
    ) -> Result<()> {
        let (forward, inverse) = self.predicate_pair(attr);
        let forward_uri = uri::normalize(&forward, namespace);
        let inverse_uri = uri::normalize(&inverse, namespace);
        for item in items {
            let raw = item.as_str().ok_or_else(|| {
                BomGraphError::Ingest(format!("non-string reference in attribute '{}'", attr))
            })?;
            let target_local = self.reference_local_name(raw);
            if target_local.is_empty() {
                return Err(BomGraphError::Ingest(format!(
                    "blank reference in attribute '{}'",
                    attr
                )));
            }
            let target = uri::normalize(&target_local, namespace);
            self.graph
                .insert_triple(subject, &forward_uri, Term::Iri(target.clone()));
            self.graph
                .insert_triple(&target, &inverse_uri, Term::Iri(subject.to_string()));
        }
        Ok(())
    }

    /// Forward/inverse predicate names for an array attribute: the configured
    /// relation table wins, else the has_<attr> / <attr>_of convention.
    fn predicate_pair(&self, attr: &str) -> (String, String) {
        if let Some([forward, inverse]) = self.settings.relations.get(attr) {
            (forward.clone(), inverse.clone())
        } else {
            (format!("has_{}", attr), format!("{}_of", attr))
        }
    }

    /// Referenced identifiers are trimmed, prefix-stripped, and lower-cased.
    fn reference_local_name(&self, raw: &str) -> String {
        let mut value = raw.trim();
        for prefix in &self.settings.strip_prefixes {
            if let Some(stripped) = value.strip_prefix(prefix.as_str()) {
                value = stripped;
                break;
            }
        }
        value.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeDirection, QueryBackend};
    use serde_json::json;

    const NS: &str = "http://example.com/graph#";

    fn settings() -> IngestConfig {
        let mut cfg = IngestConfig {
            type_name: "Library".to_string(),
            strip_prefixes: vec!["pypi_".to_string()],
            ..IngestConfig::default()
        };
        cfg.relations.insert(
            "dependency_ids".to_string(),
            ["uses_library".to_string(), "used_by_library".to_string()],
        );
        cfg
    }

    fn flask_doc() -> Value {
        json!({
            "_id": "pypi_flask",
            "name": "Flask",
            "libtype": "pypi",
            "kwds": "flask wsgi python",
            "release_count": 57,
            "dependency_ids": ["pypi_jinja2", "pypi_werkzeug"]
        })
    }

    #[test]
    fn test_ingest_creates_subject_properties_and_type() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&flask_doc())
            .unwrap();

        let flask = format!("{}flask", NS);
        assert!(g.exists(&flask).unwrap());
        let props = g.properties_of(&flask).unwrap();
        // name is identifier-like and lower-cased; kwds kept verbatim
        assert!(props
            .iter()
            .any(|(p, v)| p.ends_with("#name") && v.as_str() == "flask"));
        assert!(props
            .iter()
            .any(|(p, v)| p.ends_with("#release_count") && v.as_str() == "57"));
    }

    #[test]
    fn test_ingest_creates_bidirectional_edges() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&flask_doc())
            .unwrap();

        let flask = format!("{}flask", NS);
        let jinja = format!("{}jinja2", NS);
        let flask_edges = g.generic_edges_of(&flask, 40).unwrap();
        assert!(flask_edges.iter().any(|e| e.neighbor == jinja
            && e.direction == EdgeDirection::Outbound
            && e.predicate.ends_with("#uses_library")));
        let jinja_edges = g.generic_edges_of(&jinja, 40).unwrap();
        assert!(jinja_edges.iter().any(|e| e.neighbor == flask
            && e.direction == EdgeDirection::Outbound
            && e.predicate.ends_with("#used_by_library")));
    }

    #[test]
    fn test_reingestion_is_idempotent() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        {
            let mut builder = TriplesBuilder::new(&mut g, &cfg);
            builder.ingest_document(&flask_doc()).unwrap();
        }
        let triples_after_first = g.triple_count();
        {
            let mut builder = TriplesBuilder::new(&mut g, &cfg);
            builder.ingest_document(&flask_doc()).unwrap();
        }
        assert_eq!(g.triple_count(), triples_after_first);
    }

    #[test]
    fn test_unmapped_array_uses_convention() {
        let cfg = IngestConfig::default();
        let mut g = MemoryGraph::new(NS);
        TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&json!({"_id": "x", "deps": ["y"]}))
            .unwrap();
        let x = format!("{}x", NS);
        let edges = g.generic_edges_of(&x, 40).unwrap();
        assert!(edges
            .iter()
            .any(|e| e.predicate.ends_with("#has_deps")
                && e.direction == EdgeDirection::Outbound));
        let y = format!("{}y", NS);
        let y_edges = g.generic_edges_of(&y, 40).unwrap();
        assert!(y_edges
            .iter()
            .any(|e| e.predicate.ends_with("#deps_of")
                && e.direction == EdgeDirection::Outbound));
    }

    #[test]
    fn test_missing_id_attribute_is_an_error() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        let err = TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&json!({"name": "orphan"}))
            .unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn test_nested_value_is_an_error() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        let err = TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&json!({"_id": "x", "meta": {"a": 1}}))
            .unwrap_err();
        assert!(err.to_string().contains("meta"));
    }

    #[test]
    fn test_underscore_attributes_skipped() {
        let cfg = settings();
        let mut g = MemoryGraph::new(NS);
        TriplesBuilder::new(&mut g, &cfg)
            .ingest_document(&json!({"_id": "x", "_rid": "abc", "name": "x"}))
            .unwrap();
        let props = g.properties_of(&format!("{}x", NS)).unwrap();
        assert!(!props.iter().any(|(p, _)| p.ends_with("#_rid")));
    }
}
