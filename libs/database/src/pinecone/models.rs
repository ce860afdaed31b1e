//! Wire types for the Pinecone REST data plane and control plane.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest `topK` the query endpoint accepts
pub const MAX_TOP_K: u32 = 10_000;

/// `GET /indexes/{name}` response (only the fields the connector reads)
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
}

/// `POST /describe_index_stats` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub dimension: Option<u32>,
}

/// `POST /query` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: u32,
    pub include_metadata: bool,
    pub include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl QueryRequest {
    /// Nearest-neighbour query returning metadata but not stored values.
    pub fn with_metadata(vector: Vec<f32>, top_k: u32) -> Self {
        Self {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: None,
        }
    }
}

/// `POST /query` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<ScoredVector>,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// One match, in descending-similarity order within `QueryResponse::matches`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredVector {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl ScoredVector {
    /// String metadata field; missing or non-string values read as `None`.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}
