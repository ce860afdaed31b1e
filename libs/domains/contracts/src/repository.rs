use async_trait::async_trait;
use database::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

use crate::models::{EmbeddingVector, IndexMatch, IndexStatistics};

/// Read access to an open vector index handle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractIndex: Send + Sync {
    /// Cheap introspection call, also used as the liveness probe
    async fn stats(&self) -> DatabaseResult<IndexStatistics>;

    /// `top_k` nearest neighbours with metadata, in descending similarity
    async fn query(&self, vector: &EmbeddingVector, top_k: u32) -> DatabaseResult<Vec<IndexMatch>>;
}

/// Opens fresh index handles; the connection manager owns the result
#[cfg_attr(test, mockall::automock(type Index = MockContractIndex;))]
#[async_trait]
pub trait IndexConnector: Send + Sync {
    type Index: ContractIndex + 'static;

    async fn open(&self) -> DatabaseResult<Self::Index>;
}

/// Stored entry of the in-memory index
#[derive(Debug, Clone)]
pub struct StoredVector {
    pub id: String,
    pub values: Vec<f32>,
    pub file: String,
    pub text: String,
}

impl StoredVector {
    pub fn new(
        id: impl Into<String>,
        values: Vec<f32>,
        file: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            values,
            file: file.into(),
            text: text.into(),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// In-memory index (for development/testing)
///
/// Cosine similarity, ties kept in insertion order. A zero probe therefore
/// scores every vector 0 and lists them as inserted. `fail_next_calls`
/// injects transient failures into the next stats/query calls.
#[derive(Debug, Default, Clone)]
pub struct InMemoryContractIndex {
    vectors: Arc<RwLock<Vec<StoredVector>>>,
    failures_pending: Arc<AtomicU32>,
}

impl InMemoryContractIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, vector: StoredVector) {
        self.vectors.write().await.push(vector);
    }

    /// Make the next `count` stats/query calls fail.
    pub fn fail_next_calls(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> DatabaseResult<()> {
        let took = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took {
            Err(DatabaseError::ConnectionFailed(
                "in-memory index: injected failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContractIndex for InMemoryContractIndex {
    async fn stats(&self) -> DatabaseResult<IndexStatistics> {
        self.take_failure()?;
        let vectors = self.vectors.read().await;
        Ok(IndexStatistics {
            total_vector_count: vectors.len() as u64,
            dimension: vectors.first().map(|v| v.values.len() as u32),
        })
    }

    async fn query(&self, vector: &EmbeddingVector, top_k: u32) -> DatabaseResult<Vec<IndexMatch>> {
        self.take_failure()?;
        let vectors = self.vectors.read().await;

        let mut scored: Vec<(f32, &StoredVector)> = vectors
            .iter()
            .map(|v| (cosine_similarity(vector.as_slice(), &v.values), v))
            .collect();
        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k as usize)
            .map(|(score, v)| IndexMatch {
                id: v.id.clone(),
                score,
                file: v.file.clone(),
                text: v.text.clone(),
            })
            .collect())
    }
}

/// Connector handing out the shared in-memory index
///
/// `set_reachable(false)` makes every `open` fail; `opens()` counts calls.
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    index: InMemoryContractIndex,
    reachable: Arc<AtomicBool>,
    opens: Arc<AtomicU32>,
}

impl InMemoryConnector {
    pub fn new(index: InMemoryContractIndex) -> Self {
        Self {
            index,
            reachable: Arc::new(AtomicBool::new(true)),
            opens: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn index(&self) -> &InMemoryContractIndex {
        &self.index
    }
}

#[async_trait]
impl IndexConnector for InMemoryConnector {
    type Index = InMemoryContractIndex;

    async fn open(&self) -> DatabaseResult<Self::Index> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionFailed(
                "in-memory index unreachable".to_string(),
            ));
        }
        Ok(self.index.clone())
    }
}
