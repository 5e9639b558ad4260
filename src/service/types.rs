//! Request/response wire models for the graph service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traverse::NodeMap;

/// BOM traversal request.
#[derive(Debug, Clone, Deserialize)]
pub struct BomQueryRequest {
    pub entrypoint: String,
    pub max_depth: u32,
}

/// BOM traversal response: the full session node map plus bookkeeping.
#[derive(Debug, Serialize)]
pub struct BomQueryResponse {
    pub entrypoint: String,
    pub max_depth: u32,
    pub actual_depth: u32,
    pub nodes: NodeMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Incremental ingestion request (change-feed style).
#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    pub documents: Vec<Value>,
}

/// Incremental ingestion summary.
#[derive(Debug, Serialize)]
pub struct AddDocumentsResponse {
    pub input_count: usize,
    pub processed_count: usize,
    pub failure_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    pub elapsed_ms: u64,
}

/// Full rebuild-and-swap summary.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub document_count: u64,
    pub elapsed_ms: u64,
}

/// Service health snapshot.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_count: usize,
    pub triple_count: usize,
    pub docs_loaded: u64,
    pub successful_queries: u64,
    pub unsuccessful_queries: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_successful_query: Option<String>,
    pub uptime_seconds: i64,
}

/// Liveness echo.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub epoch_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traverse::TraversedNode;
    use std::collections::HashMap;

    #[test]
    fn test_bom_request_deserializes() {
        let req: BomQueryRequest =
            serde_json::from_str(r#"{"entrypoint": "flask", "max_depth": 3}"#).unwrap();
        assert_eq!(req.entrypoint, "flask");
        assert_eq!(req.max_depth, 3);
    }

    #[test]
    fn test_bom_response_shape() {
        let mut nodes: NodeMap = HashMap::new();
        nodes.insert(
            "http://example.com/graph#flask".to_string(),
            TraversedNode::new("http://example.com/graph#flask".to_string(), 0),
        );
        let resp = BomQueryResponse {
            entrypoint: "flask".to_string(),
            max_depth: 2,
            actual_depth: 0,
            nodes,
            error: None,
            elapsed_ms: 7,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["entrypoint"], "flask");
        assert!(json.get("error").is_none());
        let node = &json["nodes"]["http://example.com/graph#flask"];
        assert_eq!(node["display_name"], "flask");
        assert_eq!(node["depth"], 0);
        assert_eq!(node["visited"], false);
    }
}
