use async_trait::async_trait;

use crate::error::ContractResult;
use crate::models::EmbeddingVector;

/// Text to vector conversion through a remote model.
///
/// Implementations are stateless per call. Callers validate that `text` is
/// non-empty; any provider-side failure comes back as `EmbeddingFailed` and is
/// not retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> ContractResult<EmbeddingVector>;
}
