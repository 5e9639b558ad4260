//! In-memory entity-relationship graph: shared types, the query-backend
//! trait, the triple store, and the coarse-lock graph handle.

pub mod backend;
pub mod handle;
pub mod store;
pub mod uri;

pub use backend::QueryBackend;
pub use handle::GraphHandle;
pub use store::MemoryGraph;

use serde::{Deserialize, Serialize};

/// Type-declaration predicate, excluded from property enumeration and
/// neighborhood expansion.
pub const TYPE_PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Subtype predicate, excluded from neighborhood expansion.
pub const SUBCLASS_PREDICATE: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

/// Reserved schema vocabularies whose keys never contribute display or edge
/// labels.
pub const SYSTEM_KEY_PREFIXES: &[&str] = &["rdf", "rdfs", "owl"];

/// True for predicates that declare type/subtype structure rather than a
/// domain relationship.
pub fn is_schema_predicate(predicate: &str) -> bool {
    predicate == TYPE_PREDICATE || predicate == SUBCLASS_PREDICATE
}

/// True for property keys that belong to a reserved schema vocabulary.
pub fn is_system_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SYSTEM_KEY_PREFIXES.iter().any(|p| lower.starts_with(p)) || lower == "type"
}

/// Object position of a stored triple: another node, or a literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Iri(String),
    Literal(String),
}

impl Term {
    pub fn as_str(&self) -> &str {
        match self {
            Term::Iri(s) => s,
            Term::Literal(s) => s,
        }
    }
}

/// Edge orientation relative to the node whose neighborhood was queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    Outbound,
    Inbound,
}

/// One row of a generic neighborhood query.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeBinding {
    pub predicate: String,
    pub neighbor: String,
    pub direction: EdgeDirection,
}
