//! BOM traversal: session types, entrypoint resolution, property enrichment,
//! and the depth-bounded expansion engine.

pub mod engine;
pub mod enrich;
pub mod resolve;

pub use engine::{TraversalEngine, TraversalOutcome};
pub use enrich::{
    coerce_literal, derive_display_label, derive_edge_label, derive_tooltip, fetch_properties,
};
pub use resolve::resolve_entrypoint;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::graph::{uri, EdgeDirection};

/// A coerced property value: integer-looking literals become integers,
/// decimal-looking literals become floats, everything else stays text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Short-key property bag, deterministically ordered for stable responses.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// A neighbor discovered during traversal, annotated with its properties and
/// a derived human-readable edge label.
#[derive(Debug, Clone, Serialize)]
pub struct RichConnection {
    pub target: String,
    pub predicate: String,
    pub direction: EdgeDirection,
    pub properties: PropertyBag,
    pub edge_label: String,
}

/// One node of a traversal session.
///
/// `depth` is the distance at which the node was first discovered and is
/// never revised; `visited` flips true exactly once, when the neighborhood
/// has been fetched.
#[derive(Debug, Clone, Serialize)]
pub struct TraversedNode {
    pub identifier: String,
    pub display_name: String,
    pub visited: bool,
    pub depth: u32,
    pub connections: Vec<RichConnection>,
    pub self_properties: PropertyBag,
}

impl TraversedNode {
    pub fn new(identifier: String, depth: u32) -> Self {
        let display_name = uri::local_name(&identifier).to_string();
        Self {
            identifier,
            display_name,
            visited: false,
            depth,
            connections: Vec::new(),
            self_properties: PropertyBag::new(),
        }
    }
}

/// Full session result: node map keyed by absolute identifier.
pub type NodeMap = HashMap<String, TraversedNode>;
