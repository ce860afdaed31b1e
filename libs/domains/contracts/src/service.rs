use database::pinecone::MAX_TOP_K;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::connection::{Connection, ConnectionManager};
use crate::embedding::EmbeddingProvider;
use crate::error::{ContractError, ContractResult};
use crate::models::{
    EmbeddingVector, FileList, HealthReport, IndexMatch, IndexStatistics, IndexStatus, SearchHit,
    SearchResult,
};
use crate::repository::{ContractIndex, IndexConnector};

/// Outcome of one attempt inside [`ContractService::run`]
enum AttemptError {
    /// Index call failed; eligible for one reconnect and replay
    Index(String),
    /// Returned to the caller as is
    Fatal(ContractError),
}

/// Query gateway over the contract index
///
/// Every public operation goes through [`ContractService::run`]: make sure a
/// handle exists, try once, and on an index failure reconnect and replay the
/// whole operation exactly once.
pub struct ContractService<C: IndexConnector> {
    connection: Arc<ConnectionManager<C>>,
    embeddings: Arc<dyn EmbeddingProvider>,
    config: GatewayConfig,
}

impl<C: IndexConnector> Clone for ContractService<C> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            embeddings: Arc::clone(&self.embeddings),
            config: self.config.clone(),
        }
    }
}

impl<C: IndexConnector> ContractService<C> {
    pub fn new(connector: C, embeddings: Arc<dyn EmbeddingProvider>, config: GatewayConfig) -> Self {
        let connection = ConnectionManager::new(connector, config.retry_config(), config.call_timeout);
        Self {
            connection: Arc::new(connection),
            embeddings,
            config,
        }
    }

    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    /// Eager connect, returning the vector count seen by the probe.
    pub async fn connect(&self) -> ContractResult<u64> {
        self.connection.connect().await.map(|c| c.total_vectors)
    }

    /// Forget the index handle (shutdown cleanup).
    pub async fn close(&self) {
        self.connection.close().await;
    }

    /// Semantic search: embed `query` and return the `limit` nearest chunks.
    ///
    /// `total` is the number of hits returned.
    pub async fn search(&self, query: &str, limit: u32) -> ContractResult<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ContractError::InvalidArgument(
                "query parameter 'q' must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(ContractError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }
        let top_k = limit.min(MAX_TOP_K);

        self.run("search", |index| self.search_attempt(index, query, top_k))
            .await
    }

    /// Page through the index in the order it returns matches for a zero probe.
    ///
    /// `total` is the index-wide vector count, independent of `skip`/`limit`.
    /// Pages are not guaranteed stable across calls, and `skip + limit` beyond
    /// 10 000 cannot be reached.
    pub async fn list(&self, skip: u32, limit: u32) -> ContractResult<SearchResult> {
        self.run("list", |index| self.list_attempt(index, skip, limit))
            .await
    }

    /// Distinct source filenames, sorted, over at most `distinct_files_cap` vectors.
    pub async fn distinct_files(&self) -> ContractResult<FileList> {
        self.run("distinct_files", |index| self.distinct_files_attempt(index))
            .await
    }

    /// Health of the index connection.
    ///
    /// A live handle is probed; a failed probe triggers a reconnect and
    /// reports `degraded`. Without a handle a connect is attempted and the
    /// outcome reported as `online/reconnected` or `partial`.
    pub async fn health(&self) -> HealthReport {
        match self.connection.current().await {
            Some(connection) => match self.index_stats(&connection.index).await {
                Ok(stats) => {
                    HealthReport::online(IndexStatus::Connected, Some(stats.total_vector_count))
                }
                Err(e) => {
                    warn!(error = %e, "Health probe failed, reconnecting");
                    let index_status = match self.connection.reconnect(connection.generation).await {
                        Ok(_) => IndexStatus::Reconnected,
                        Err(_) => IndexStatus::Disconnected,
                    };
                    HealthReport::degraded(e, index_status)
                }
            },
            None => match self.connection.ensure_connected().await {
                Ok(connection) => HealthReport::online(
                    IndexStatus::Reconnected,
                    Some(connection.total_vectors),
                ),
                Err(e) => HealthReport::partial(e.to_string()),
            },
        }
    }

    /// Readiness: probe the current handle without reconnecting.
    pub async fn check_ready(&self) -> Result<(), String> {
        let connection = self
            .connection
            .current()
            .await
            .ok_or_else(|| "vector index not connected".to_string())?;
        self.index_stats(&connection.index).await.map(|_| ())
    }

    async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> ContractResult<T>
    where
        F: FnMut(Arc<C::Index>) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let connection: Connection<C::Index> = self.connection.ensure_connected().await?;

        let first_error = match attempt(Arc::clone(&connection.index)).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Index(e)) => e,
        };

        warn!(operation, error = %first_error, "Index call failed, reconnecting and retrying once");

        let fresh = self
            .connection
            .reconnect(connection.generation)
            .await
            .map_err(|e| ContractError::QueryFailed(format!("{}; {}", first_error, e)))?;

        match attempt(fresh.index).await {
            Ok(value) => Ok(value),
            Err(AttemptError::Fatal(e)) => Err(e),
            Err(AttemptError::Index(e)) => Err(ContractError::QueryFailed(e)),
        }
    }

    async fn search_attempt(
        &self,
        index: Arc<C::Index>,
        query: &str,
        top_k: u32,
    ) -> Result<SearchResult, AttemptError> {
        let vector = self.embed(query).await.map_err(AttemptError::Fatal)?;
        // hits keep the store ranking; score direction depends on the index metric
        let hits: Vec<SearchHit> = self
            .index_query(&index, &vector, top_k)
            .await
            .map_err(AttemptError::Index)?
            .into_iter()
            .take(top_k as usize)
            .map(SearchHit::from)
            .collect();

        debug!(hits = hits.len(), "Search completed");
        Ok(SearchResult {
            total: hits.len() as u64,
            hits,
        })
    }

    async fn list_attempt(
        &self,
        index: Arc<C::Index>,
        skip: u32,
        limit: u32,
    ) -> Result<SearchResult, AttemptError> {
        let stats = self.index_stats(&index).await.map_err(AttemptError::Index)?;
        let total = stats.total_vector_count;

        let probe = skip.saturating_add(limit).min(MAX_TOP_K);
        if limit == 0 || probe == 0 {
            return Ok(SearchResult {
                hits: Vec::new(),
                total,
            });
        }

        let hits = self
            .index_query(&index, &EmbeddingVector::zeros(), probe)
            .await
            .map_err(AttemptError::Index)?
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(SearchHit::from)
            .collect();

        Ok(SearchResult { hits, total })
    }

    async fn distinct_files_attempt(&self, index: Arc<C::Index>) -> Result<FileList, AttemptError> {
        let stats = self.index_stats(&index).await.map_err(AttemptError::Index)?;

        let top_k = stats
            .total_vector_count
            .min(u64::from(self.config.distinct_files_cap))
            .min(u64::from(MAX_TOP_K)) as u32;
        if top_k == 0 {
            return Ok(FileList { files: Vec::new() });
        }

        let files: BTreeSet<String> = self
            .index_query(&index, &EmbeddingVector::zeros(), top_k)
            .await
            .map_err(AttemptError::Index)?
            .into_iter()
            .map(|m| m.file)
            .filter(|file| !file.is_empty())
            .collect();

        Ok(FileList {
            files: files.into_iter().collect(),
        })
    }

    async fn embed(&self, text: &str) -> ContractResult<EmbeddingVector> {
        timeout(self.config.call_timeout, self.embeddings.embed(text))
            .await
            .map_err(|_| {
                ContractError::QueryFailed(format!(
                    "embedding request timed out after {}",
                    format_duration(self.config.call_timeout)
                ))
            })?
    }

    async fn index_stats(&self, index: &C::Index) -> Result<IndexStatistics, String> {
        timeout(self.config.call_timeout, index.stats())
            .await
            .map_err(|_| {
                format!(
                    "index stats timed out after {}",
                    format_duration(self.config.call_timeout)
                )
            })?
            .map_err(|e| e.to_string())
    }

    async fn index_query(
        &self,
        index: &C::Index,
        vector: &EmbeddingVector,
        top_k: u32,
    ) -> Result<Vec<IndexMatch>, String> {
        timeout(self.config.call_timeout, index.query(vector, top_k))
            .await
            .map_err(|_| {
                format!(
                    "index query timed out after {}",
                    format_duration(self.config.call_timeout)
                )
            })?
            .map_err(|e| e.to_string())
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f32())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::EMBEDDING_DIMENSION;
    use crate::repository::{
        InMemoryConnector, InMemoryContractIndex, MockContractIndex, MockIndexConnector, StoredVector,
    };
    use database::DatabaseError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config() -> GatewayConfig {
        GatewayConfig::default()
    }

    fn stats(total: u64) -> IndexStatistics {
        IndexStatistics {
            total_vector_count: total,
            dimension: Some(EMBEDDING_DIMENSION as u32),
        }
    }

    fn hit(file: &str, score: f32) -> IndexMatch {
        IndexMatch {
            id: format!("{file}-{score}"),
            score,
            file: file.to_string(),
            text: format!("chunk of {file}"),
        }
    }

    fn embeddings(times: usize) -> Arc<dyn EmbeddingProvider> {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .times(times)
            .returning(|_| Ok(EmbeddingVector::zeros()));
        Arc::new(provider)
    }

    fn no_embeddings() -> Arc<dyn EmbeddingProvider> {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().never();
        Arc::new(provider)
    }

    /// Connector whose every handle answers `stats` with `total` and `query`
    /// with `matches` truncated to `top_k`.
    fn connector_with(total: u64, matches: Vec<IndexMatch>) -> MockIndexConnector {
        let matches = Arc::new(matches);
        let mut connector = MockIndexConnector::new();
        connector.expect_open().returning(move || {
            let matches = Arc::clone(&matches);
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(move || Ok(stats(total)));
            index.expect_query().returning(move |_, top_k| {
                Ok(matches.iter().take(top_k as usize).cloned().collect())
            });
            Ok(index)
        });
        connector
    }

    async fn in_memory_service(
        docs: &[(&str, &str)],
    ) -> (ContractService<InMemoryConnector>, InMemoryConnector) {
        let index = InMemoryContractIndex::new();
        for (i, (file, text)) in docs.iter().enumerate() {
            let mut values = vec![0.0; EMBEDDING_DIMENSION];
            values[i % EMBEDDING_DIMENSION] = 1.0;
            index
                .insert(StoredVector::new(format!("v{i}"), values, *file, *text))
                .await;
        }
        let connector = InMemoryConnector::new(index);
        let service = ContractService::new(connector.clone(), embeddings_any(), config());
        (service, connector)
    }

    fn embeddings_any() -> Arc<dyn EmbeddingProvider> {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| {
            let mut values = vec![0.0; EMBEDDING_DIMENSION];
            values[0] = 1.0;
            EmbeddingVector::new(values)
        });
        Arc::new(provider)
    }

    #[tokio::test]
    async fn test_search_empty_query_makes_no_calls() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().never();
        let service = ContractService::new(connector, no_embeddings(), config());

        for query in ["", "   "] {
            let err = service.search(query, 5).await.unwrap_err();
            assert!(matches!(err, ContractError::InvalidArgument(_)));
        }
    }

    #[tokio::test]
    async fn test_search_zero_limit_is_invalid() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().never();
        let service = ContractService::new(connector, no_embeddings(), config());

        let err = service.search("multa", 0).await.unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_search_returns_at_most_limit_hits_in_store_order() {
        // euclidean-style ranking: the best match carries the lowest score
        let matches = vec![hit("best.pdf", 0.1), hit("mid.pdf", 0.5), hit("worst.pdf", 0.9), hit("far.pdf", 1.4)];
        let service = ContractService::new(connector_with(4, matches), embeddings(1), config());

        let result = service.search("prazo de vigência", 3).await.unwrap();

        assert_eq!(result.total, 3);
        let files: Vec<_> = result.hits.iter().map(|h| h.file.as_str()).collect();
        assert_eq!(files, ["best.pdf", "mid.pdf", "worst.pdf"]);
        let scores: Vec<f32> = result.hits.iter().map(|h| h.score).collect();
        assert_eq!(scores, [0.1, 0.5, 0.9]);
    }

    #[tokio::test]
    async fn test_search_limit_is_clamped_to_store_maximum() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(1).returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(2)));
            index
                .expect_query()
                .withf(|_, top_k| *top_k == MAX_TOP_K)
                .times(1)
                .returning(|_, _| Ok(vec![hit("a.pdf", 0.9), hit("b.pdf", 0.4)]));
            Ok(index)
        });
        let service = ContractService::new(connector, embeddings(1), config());

        let result = service.search("multa", 50_000).await.unwrap();
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_search_embedding_failure_is_not_retried() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .times(1)
            .returning(|_| Err(ContractError::EmbeddingFailed("quota exceeded".to_string())));

        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(1).returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(1)));
            index.expect_query().never();
            Ok(index)
        });

        let service = ContractService::new(connector, Arc::new(provider), config());
        let err = service.search("multa", 5).await.unwrap_err();

        assert!(matches!(err, ContractError::EmbeddingFailed(ref m) if m.contains("quota")));
    }

    #[tokio::test]
    async fn test_list_total_is_index_count_for_any_window() {
        let matches: Vec<_> = (0..20).map(|i| hit(&format!("f{i}.pdf"), 0.0)).collect();
        let service = ContractService::new(connector_with(20, matches), no_embeddings(), config());

        for (skip, limit) in [(0, 0), (0, 10), (5, 3), (18, 10), (50, 10)] {
            let result = service.list(skip, limit).await.unwrap();
            assert_eq!(result.total, 20, "skip={skip} limit={limit}");
            let expected = 20u32.saturating_sub(skip).min(limit) as usize;
            assert_eq!(result.hits.len(), expected, "skip={skip} limit={limit}");
        }
    }

    #[tokio::test]
    async fn test_list_applies_skip_window() {
        let matches: Vec<_> = (0..6).map(|i| hit(&format!("f{i}.pdf"), 0.0)).collect();
        let service = ContractService::new(connector_with(6, matches), no_embeddings(), config());

        let result = service.list(2, 2).await.unwrap();
        let files: Vec<_> = result.hits.iter().map(|h| h.file.as_str()).collect();
        assert_eq!(files, ["f2.pdf", "f3.pdf"]);
    }

    #[tokio::test]
    async fn test_list_zero_limit_makes_no_query() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(1).returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(7)));
            index.expect_query().never();
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        let result = service.list(0, 0).await.unwrap();
        assert!(result.hits.is_empty());
        assert_eq!(result.total, 7);
    }

    #[tokio::test]
    async fn test_list_window_is_clamped() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(50_000)));
            index
                .expect_query()
                .withf(|_, top_k| *top_k == MAX_TOP_K)
                .times(1)
                .returning(|_, _| Ok(Vec::new()));
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        let result = service.list(9_995, 10).await.unwrap();
        assert!(result.hits.is_empty());
        assert_eq!(result.total, 50_000);
    }

    #[tokio::test]
    async fn test_distinct_files_are_unique_and_sorted() {
        let matches = vec![
            hit("b.pdf", 0.0),
            hit("a.pdf", 0.0),
            hit("b.pdf", 0.0),
            hit("", 0.0),
            hit("c.pdf", 0.0),
            hit("a.pdf", 0.0),
        ];
        let service = ContractService::new(connector_with(6, matches), no_embeddings(), config());

        let result = service.distinct_files().await.unwrap();
        assert_eq!(result.files, ["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_distinct_files_query_respects_cap() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(5_000)));
            index
                .expect_query()
                .withf(|_, top_k| *top_k == 1000)
                .times(1)
                .returning(|_, _| Ok(vec![hit("x.pdf", 0.0)]));
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        assert_eq!(service.distinct_files().await.unwrap().files, ["x.pdf"]);
    }

    #[tokio::test]
    async fn test_empty_index_lists_nothing_without_querying() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(0)));
            index.expect_query().never();
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        let list = service.list(0, 10).await.unwrap();
        assert!(list.hits.is_empty());
        assert_eq!(list.total, 0);
        assert!(service.distinct_files().await.unwrap().files.is_empty());
    }

    #[tokio::test]
    async fn test_failed_query_reconnects_and_replays_once() {
        let opens = Arc::new(AtomicU32::new(0));
        let opens_clone = Arc::clone(&opens);

        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(2).returning(move || {
            let generation = opens_clone.fetch_add(1, Ordering::SeqCst);
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(3)));
            if generation == 0 {
                index
                    .expect_query()
                    .times(1)
                    .returning(|_, _| Err(DatabaseError::ConnectionFailed("stale handle".to_string())));
            } else {
                index
                    .expect_query()
                    .times(1)
                    .returning(|_, _| Ok(vec![hit("a.pdf", 0.8)]));
            }
            Ok(index)
        });

        // the replay starts from the top, so the query is embedded twice
        let service = ContractService::new(connector, embeddings(2), config());

        let result = service.search("reajuste", 5).await.unwrap();
        assert_eq!(result.hits.len(), 1);
        assert_eq!(opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_failure_surfaces_query_failed() {
        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(2).returning(|| {
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(3)));
            index
                .expect_query()
                .times(1)
                .returning(|_, _| Err(DatabaseError::ConnectionFailed("502 bad gateway".to_string())));
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        let err = service.distinct_files().await.unwrap_err();
        assert!(matches!(err, ContractError::QueryFailed(ref m) if m.contains("502")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reconnect_surfaces_query_failed() {
        let opens = Arc::new(AtomicU32::new(0));
        let opens_clone = Arc::clone(&opens);

        let mut connector = MockIndexConnector::new();
        connector.expect_open().times(7).returning(move || {
            if opens_clone.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(DatabaseError::ConnectionFailed("refused".to_string()));
            }
            let mut index = MockContractIndex::new();
            index.expect_stats().returning(|| Ok(stats(3)));
            index
                .expect_query()
                .returning(|_, _| Err(DatabaseError::ConnectionFailed("reset".to_string())));
            Ok(index)
        });
        let service = ContractService::new(connector, no_embeddings(), config());

        // one working open, then three refused reconnect attempts
        let err = service.list(0, 5).await.unwrap_err();
        assert!(matches!(err, ContractError::QueryFailed(_)));
        assert_eq!(opens.load(Ordering::SeqCst), 4);
        assert_eq!(service.connection().consecutive_failures(), 3);

        // the next request starts a fresh loop and the count keeps growing
        let err = service.list(0, 5).await.unwrap_err();
        assert!(matches!(err, ContractError::ServiceUnavailable(_)));
        assert_eq!(opens.load(Ordering::SeqCst), 7);
        assert_eq!(service.connection().consecutive_failures(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_store_is_unavailable_without_embedding() {
        let mut connector = MockIndexConnector::new();
        connector
            .expect_open()
            .times(3)
            .returning(|| Err(DatabaseError::ConnectionFailed("dns failure".to_string())));
        let service = ContractService::new(connector, no_embeddings(), config());
        let start = tokio::time::Instant::now();

        let err = service.search("multa", 5).await.unwrap_err();

        assert!(matches!(err, ContractError::ServiceUnavailable(ref m) if m.contains("dns failure")));
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(service.connection().consecutive_failures(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_embedding_timeout_is_query_failed() {
        struct SlowProvider;

        #[async_trait::async_trait]
        impl EmbeddingProvider for SlowProvider {
            fn model(&self) -> &str {
                "slow"
            }

            async fn embed(&self, _text: &str) -> ContractResult<EmbeddingVector> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(EmbeddingVector::zeros())
            }
        }

        let (_, connector) = in_memory_service(&[("a.pdf", "x")]).await;
        let service = ContractService::new(connector, Arc::new(SlowProvider), config());

        let err = service.search("multa", 5).await.unwrap_err();
        assert!(matches!(err, ContractError::QueryFailed(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn test_health_online_when_stats_succeed() {
        let (service, _) = in_memory_service(&[("a.pdf", "x"), ("b.pdf", "y")]).await;
        service.connect().await.unwrap();

        let report = service.health().await;
        assert_eq!(report, HealthReport::online(IndexStatus::Connected, Some(2)));
    }

    #[tokio::test]
    async fn test_health_without_handle_reconnects() {
        let (service, connector) = in_memory_service(&[("a.pdf", "x")]).await;

        let report = service.health().await;
        assert_eq!(report, HealthReport::online(IndexStatus::Reconnected, Some(1)));
        assert_eq!(connector.opens(), 1);
    }

    #[tokio::test]
    async fn test_health_degraded_when_stats_fail() {
        let (service, connector) = in_memory_service(&[("a.pdf", "x")]).await;
        service.connect().await.unwrap();
        connector.index().fail_next_calls(1);

        let report = service.health().await;
        assert_eq!(report.status, crate::models::ServiceStatus::Degraded);
        assert_eq!(report.index_status, Some(IndexStatus::Reconnected));
        assert!(report.error.unwrap().contains("injected failure"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_partial_when_unreachable() {
        let (service, connector) = in_memory_service(&[]).await;
        connector.set_reachable(false);

        let report = service.health().await;
        assert_eq!(report.status, crate::models::ServiceStatus::Partial);
        assert_eq!(report.index_status, Some(IndexStatus::Disconnected));
        assert_eq!(connector.opens(), 3);
    }

    #[tokio::test]
    async fn test_check_ready_does_not_connect() {
        let (service, connector) = in_memory_service(&[("a.pdf", "x")]).await;

        assert!(service.check_ready().await.is_err());
        assert_eq!(connector.opens(), 0);

        service.connect().await.unwrap();
        assert!(service.check_ready().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_share_failed_connect() {
        let (service, connector) = in_memory_service(&[("a.pdf", "x")]).await;
        connector.set_reachable(false);
        let service = Arc::new(service);
        let start = tokio::time::Instant::now();

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.list(0, 10).await })
            })
            .collect();
        for task in tasks {
            let err = task.await.unwrap().unwrap_err();
            assert!(matches!(err, ContractError::ServiceUnavailable(_)));
        }

        assert_eq!(connector.opens(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_reconnect() {
        let (service, connector) = in_memory_service(&[("a.pdf", "x"), ("b.pdf", "y")]).await;
        let service = Arc::new(service);
        let errors = Arc::new(Mutex::new(Vec::new()));

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let service = Arc::clone(&service);
                let errors = Arc::clone(&errors);
                tokio::spawn(async move {
                    if let Err(e) = service.distinct_files().await {
                        errors.lock().unwrap().push(e.to_string());
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(errors.lock().unwrap().is_empty());
        assert_eq!(connector.opens(), 1);
    }
}
