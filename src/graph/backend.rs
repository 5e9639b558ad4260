//! The four query primitives the traversal core consumes.

use crate::error::Result;
use crate::graph::{EdgeBinding, Term};

/// Pattern-query backend contract.
///
/// The traversal engine, entry resolver, and property enricher depend only on
/// these four operation shapes, not on how bindings are produced. The
/// reference realization is [`crate::graph::MemoryGraph`].
pub trait QueryBackend {
    /// Exact-match existence check for an absolute identifier.
    fn exists(&self, identifier: &str) -> Result<bool>;

    /// All (predicate, value) pairs attached to a node, excluding the
    /// reflexive type declaration.
    fn properties_of(&self, identifier: &str) -> Result<Vec<(String, Term)>>;

    /// Generic neighborhood enumeration: outbound and inbound edges,
    /// excluding type/subtype predicates, capped at `limit` rows.
    fn generic_edges_of(&self, identifier: &str, limit: usize) -> Result<Vec<EdgeBinding>>;

    /// Case-insensitive literal substring search across all property values;
    /// returns up to `limit` distinct node identifiers.
    fn literal_search(&self, term: &str, limit: usize) -> Result<Vec<String>>;
}
