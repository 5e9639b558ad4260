//! Property enrichment: fetch + coercion, display labels, edge labels.
//!
//! Relationship and property names are discovered at runtime, so every
//! heuristic here works from ordered priority tables over plain string keys.

use crate::error::Result;
use crate::graph::{is_system_key, uri, EdgeDirection, QueryBackend, Term};
use crate::traverse::{PropertyBag, PropertyValue};

/// Conventional name-like keys, most specific first.
const DISPLAY_PRIORITY_KEYS: &[&str] = &["name", "label", "title", "identifier", "id", "tag"];

/// Key fragments that suggest a name-like property.
const DISPLAY_KEY_HINTS: &[&str] = &["name", "label", "title", "tag"];

/// Key fragments that suggest endpoint semantics on a connection.
const ENDPOINT_KEY_HINTS: &[&str] = &["start", "end", "from", "to", "source", "target"];

/// Reserved bag key a caller may set to force an edge label.
const EXPLICIT_EDGE_LABEL_KEY: &str = "edge_label";

/// Placeholder when nothing better can be derived.
const FALLBACK_EDGE_LABEL: &str = "connected";

/// Coerce one literal: i64 first, then f64 for decimal-looking strings.
pub fn coerce_literal(raw: &str) -> PropertyValue {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return PropertyValue::Integer(int);
    }
    // the digit guard keeps "inf"/"nan" and bare words textual
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(float) = trimmed.parse::<f64>() {
            return PropertyValue::Float(float);
        }
    }
    PropertyValue::Text(raw.to_string())
}

/// Fetch all properties of a node as a short-key bag.
///
/// Keys are the sanitized local names of the predicates; identifier-valued
/// results are reduced to their trailing local name.
pub fn fetch_properties<B: QueryBackend>(backend: &B, identifier: &str) -> Result<PropertyBag> {
    let mut bag = PropertyBag::new();
    for (predicate, value) in backend.properties_of(identifier)? {
        let key = uri::sanitize_for_pattern_variable(uri::local_name(&predicate));
        let coerced = match value {
            Term::Literal(ref text) => coerce_literal(text),
            Term::Iri(ref target) => PropertyValue::Text(uri::local_name(target).to_string()),
        };
        bag.insert(key, coerced);
    }
    Ok(bag)
}

/// Derive a display label for a node from its property bag.
pub fn derive_display_label(bag: &PropertyBag, fallback_identifier: &str) -> String {
    for key in DISPLAY_PRIORITY_KEYS {
        if let Some(value) = bag.get(*key) {
            let rendered = value.to_string();
            if !rendered.is_empty() {
                return rendered;
            }
        }
    }
    for (key, value) in bag {
        let lower = key.to_lowercase();
        if DISPLAY_KEY_HINTS.iter().any(|hint| lower.contains(hint)) {
            let rendered = value.to_string();
            if !rendered.is_empty() {
                return rendered;
            }
        }
    }
    let local = uri::local_name(fallback_identifier);
    if !local.is_empty() {
        local.to_string()
    } else {
        fallback_identifier.to_string()
    }
}

/// Derive an edge label for a connection, decorated with a direction arrow.
///
/// Priority: explicit label attached by the caller, the connecting predicate
/// name, a short non-system property, an endpoint-semantic key, the first
/// non-system property, then a fixed placeholder.
pub fn derive_edge_label(
    properties: &PropertyBag,
    predicate: &str,
    direction: EdgeDirection,
) -> String {
    decorate(raw_edge_label(properties, predicate), direction)
}

fn raw_edge_label(properties: &PropertyBag, predicate: &str) -> String {
    if let Some(explicit) = properties.get(EXPLICIT_EDGE_LABEL_KEY) {
        let rendered = explicit.to_string();
        if !rendered.is_empty() {
            return rendered;
        }
    }

    if !predicate.is_empty() {
        return predicate.to_string();
    }

    // Prefer short, meaningful key:value pairs over long opaque ones.
    for (key, value) in properties {
        if is_system_key(key) || key == EXPLICIT_EDGE_LABEL_KEY {
            continue;
        }
        let rendered = value.to_string();
        if key.len() <= 15 && !rendered.is_empty() && rendered.len() <= 20 {
            return format!("{}:{}", key, rendered);
        }
    }

    for (key, _) in properties {
        let lower = key.to_lowercase();
        if ENDPOINT_KEY_HINTS.iter().any(|hint| lower.contains(hint)) {
            return key.clone();
        }
    }

    for (key, value) in properties {
        if is_system_key(key) || key == EXPLICIT_EDGE_LABEL_KEY {
            continue;
        }
        let rendered = value.to_string();
        if rendered.len() <= 15 {
            return format!("{}:{}", key, rendered);
        }
        return key.clone();
    }

    FALLBACK_EDGE_LABEL.to_string()
}

fn decorate(label: String, direction: EdgeDirection) -> String {
    match direction {
        EdgeDirection::Outbound => format!("{} →", label),
        EdgeDirection::Inbound => format!("← {}", label),
    }
}

/// Multi-line tooltip text for a node: display label plus its non-system
/// properties, long values truncated.
pub fn derive_tooltip(bag: &PropertyBag, fallback_identifier: &str) -> String {
    let mut tooltip = format!("Entity: {}", derive_display_label(bag, fallback_identifier));
    for (key, value) in bag {
        if is_system_key(key) || key == EXPLICIT_EDGE_LABEL_KEY {
            continue;
        }
        let mut rendered = value.to_string();
        if rendered.chars().count() > 50 {
            rendered = rendered.chars().take(47).collect::<String>();
            rendered.push_str("...");
        }
        tooltip.push_str(&format!("\n{}: {}", key, rendered));
    }
    tooltip
}
