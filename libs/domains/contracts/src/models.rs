use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ContractError, ContractResult};

/// Output dimension requested from the embedding model; must match the index
pub const EMBEDDING_DIMENSION: usize = 1024;

/// Default `limit` for semantic search
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Default `limit` for listing
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Query vector of exactly [`EMBEDDING_DIMENSION`] floats.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// Wrap provider output, rejecting any other length.
    pub fn new(values: Vec<f32>) -> ContractResult<Self> {
        if values.len() != EMBEDDING_DIMENSION {
            return Err(ContractError::EmbeddingFailed(format!(
                "expected a {}-dimension embedding, got {}",
                EMBEDDING_DIMENSION,
                values.len()
            )));
        }
        Ok(Self(values))
    }

    /// All-zero probe used to emulate listing over a similarity-only index.
    pub fn zeros() -> Self {
        Self(vec![0.0; EMBEDDING_DIMENSION])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// One contract chunk returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    /// Source filename
    pub file: String,
    /// Chunk content
    pub text: String,
    /// Similarity in the index's native range
    pub score: f32,
}

/// Hits plus a total whose meaning depends on the operation:
/// the number of hits for search, the index-wide vector count for listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    pub total: u64,
}

/// Distinct source filenames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileList {
    pub files: Vec<String>,
}

/// Raw match from an index query, metadata already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub file: String,
    pub text: String,
}

impl From<IndexMatch> for SearchHit {
    fn from(m: IndexMatch) -> Self {
        Self {
            file: m.file,
            text: m.text,
            score: m.score,
        }
    }
}

/// Index statistics reported by the liveness probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStatistics {
    pub total_vector_count: u64,
    pub dimension: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Index reachable
    Online,
    /// Serving, but the index could not be reached
    Partial,
    /// Index handle existed but its probe failed
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Connected,
    Reconnected,
    Disconnected,
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: ServiceStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_status: Option<IndexStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_vectors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn online(index_status: IndexStatus, total_vectors: Option<u64>) -> Self {
        Self {
            status: ServiceStatus::Online,
            message: "Contract search API is running".to_string(),
            index_status: Some(index_status),
            total_vectors,
            error: None,
        }
    }

    pub fn partial(error: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Partial,
            message: "API is online but has no connection to the vector index".to_string(),
            index_status: Some(IndexStatus::Disconnected),
            total_vectors: None,
            error: Some(error.into()),
        }
    }

    pub fn degraded(error: impl Into<String>, index_status: IndexStatus) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: "API is online but the vector index connection is unstable".to_string(),
            index_status: Some(index_status),
            total_vectors: None,
            error: Some(error.into()),
        }
    }
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// Query string of `GET /contratos/busca`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query (required, non-empty)
    pub q: Option<String>,
    /// Maximum number of hits
    #[serde(default = "default_search_limit")]
    #[param(default = 5, minimum = 1)]
    pub limit: u32,
}

/// Query string of `GET /contratos`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Number of probed matches to skip
    #[serde(default)]
    #[param(default = 0)]
    pub skip: u32,
    /// Page size
    #[serde(default = "default_list_limit")]
    #[param(default = 10)]
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_vector_rejects_wrong_dimension() {
        let err = EmbeddingVector::new(vec![0.1; 3072]).unwrap_err();
        assert!(matches!(err, ContractError::EmbeddingFailed(_)));
        assert!(err.to_string().contains("3072"));

        assert!(EmbeddingVector::new(vec![0.1; EMBEDDING_DIMENSION]).is_ok());
    }

    #[test]
    fn test_zeros_vector_has_embedding_dimension() {
        let probe = EmbeddingVector::zeros();
        assert_eq!(probe.as_slice().len(), EMBEDDING_DIMENSION);
        assert!(probe.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_health_report_omits_empty_fields() {
        let body = serde_json::to_value(HealthReport::online(IndexStatus::Reconnected, None)).unwrap();
        assert_eq!(body["status"], "online");
        assert_eq!(body["index_status"], "reconnected");
        assert!(body.get("total_vectors").is_none());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_params_defaults() {
        let list: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!((list.skip, list.limit), (0, DEFAULT_LIST_LIMIT));

        let search: SearchParams = serde_json::from_str(r#"{"q": "rescisão"}"#).unwrap();
        assert_eq!(search.limit, DEFAULT_SEARCH_LIMIT);
    }
}
