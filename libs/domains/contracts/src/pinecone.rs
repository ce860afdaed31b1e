use async_trait::async_trait;
use database::DatabaseResult;
use database::pinecone::{self, PineconeConfig, PineconeIndex, QueryRequest, ScoredVector};

use crate::config::MetadataFields;
use crate::models::{EmbeddingVector, IndexMatch, IndexStatistics};
use crate::repository::{ContractIndex, IndexConnector};

/// Pinecone-backed contract index
#[derive(Clone, Debug)]
pub struct PineconeContractIndex {
    index: PineconeIndex,
    fields: MetadataFields,
}

impl PineconeContractIndex {
    pub fn new(index: PineconeIndex, fields: MetadataFields) -> Self {
        Self { index, fields }
    }

    /// Missing or non-string metadata reads as an empty string.
    fn to_match(&self, scored: ScoredVector) -> IndexMatch {
        let file = scored.metadata_str(&self.fields.file).unwrap_or_default().to_string();
        let text = scored.metadata_str(&self.fields.text).unwrap_or_default().to_string();
        IndexMatch {
            id: scored.id,
            score: scored.score,
            file,
            text,
        }
    }
}

#[async_trait]
impl ContractIndex for PineconeContractIndex {
    async fn stats(&self) -> DatabaseResult<IndexStatistics> {
        let stats = self.index.describe_index_stats().await?;
        Ok(IndexStatistics {
            total_vector_count: stats.total_vector_count,
            dimension: stats.dimension,
        })
    }

    async fn query(&self, vector: &EmbeddingVector, top_k: u32) -> DatabaseResult<Vec<IndexMatch>> {
        let request = QueryRequest::with_metadata(vector.as_slice().to_vec(), top_k);
        let response = self.index.query(request).await?;
        Ok(response
            .matches
            .into_iter()
            .map(|m| self.to_match(m))
            .collect())
    }
}

/// Opens Pinecone index handles from configuration
#[derive(Clone, Debug)]
pub struct PineconeConnector {
    config: PineconeConfig,
    fields: MetadataFields,
}

impl PineconeConnector {
    pub fn new(config: PineconeConfig, fields: MetadataFields) -> Self {
        Self { config, fields }
    }
}

#[async_trait]
impl IndexConnector for PineconeConnector {
    type Index = PineconeContractIndex;

    async fn open(&self) -> DatabaseResult<Self::Index> {
        let index = pinecone::connect(&self.config).await?;
        Ok(PineconeContractIndex::new(index, self.fields.clone()))
    }
}
