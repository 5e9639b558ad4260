//! Entrypoint resolution: exact identifier match, then literal search, then a
//! best-effort seed so a traversal never fails outright.

use crate::error::Result;
use crate::graph::{uri, QueryBackend};

/// Map a user-supplied entrypoint term to one or more seed identifiers.
///
/// An exact match on the normalized identifier always wins. Otherwise every
/// node with a property value containing the term (case-insensitive, bounded
/// by `search_limit`) becomes a seed. An unknown term still yields its own
/// normalized identifier — the traversal simply discovers nothing.
pub fn resolve_entrypoint<B: QueryBackend>(
    backend: &B,
    raw_term: &str,
    namespace: &str,
    search_limit: usize,
) -> Result<Vec<String>> {
    let candidate = uri::normalize(raw_term, namespace);

    if backend.exists(&candidate)? {
        return Ok(vec![candidate]);
    }

    let matches = backend.literal_search(raw_term, search_limit)?;
    if !matches.is_empty() {
        log::debug!(
            "entrypoint '{}' resolved via literal search to {} node(s)",
            raw_term,
            matches.len()
        );
        return Ok(matches);
    }

    log::debug!("entrypoint '{}' not found, seeding {} anyway", raw_term, candidate);
    Ok(vec![candidate])
}
