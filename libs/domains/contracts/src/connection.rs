use database::common::{RetryConfig, retry_fixed};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{ContractError, ContractResult};
use crate::models::EMBEDDING_DIMENSION;
use crate::repository::{ContractIndex, IndexConnector};

/// A verified index handle
///
/// `generation` increases on every successful connect, so a caller holding a
/// stale handle can tell whether someone else already replaced it.
pub struct Connection<I> {
    pub index: Arc<I>,
    pub generation: u64,
    /// Vector count reported by the probe that verified this handle
    pub total_vectors: u64,
}

impl<I> Clone for Connection<I> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            generation: self.generation,
            total_vectors: self.total_vectors,
        }
    }
}

/// Bookkeeping owned by whoever runs the connect loop
struct ConnectState {
    generation: u64,
    /// Error of the last finished loop, `None` after a success
    last_error: Option<String>,
}

/// Owns the lifecycle of the vector index handle.
///
/// The connect loop runs under one async mutex. Callers queued behind an
/// in-flight loop take its outcome, success or failure, instead of starting
/// their own. The handle itself sits in a separate lock the loop only takes
/// for a swap, so `current` never waits for a connect to finish.
pub struct ConnectionManager<C: IndexConnector> {
    connector: C,
    retry: RetryConfig,
    call_timeout: Duration,
    current: RwLock<Option<Connection<C::Index>>>,
    connect_lock: Mutex<ConnectState>,
    finished_loops: AtomicU64,
    consecutive_failures: AtomicU32,
}

impl<C: IndexConnector> ConnectionManager<C> {
    pub fn new(connector: C, retry: RetryConfig, call_timeout: Duration) -> Self {
        Self {
            connector,
            retry,
            call_timeout,
            current: RwLock::new(None),
            connect_lock: Mutex::new(ConnectState {
                generation: 0,
                last_error: None,
            }),
            finished_loops: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Drop any current handle and run the bounded connect loop.
    pub async fn connect(&self) -> ContractResult<Connection<C::Index>> {
        let mut state = self.connect_lock.lock().await;
        self.connect_locked(&mut state).await
    }

    /// Current handle, connecting first when there is none.
    pub async fn ensure_connected(&self) -> ContractResult<Connection<C::Index>> {
        let observed = self.finished_loops.load(Ordering::SeqCst);
        if let Some(connection) = self.current().await {
            return Ok(connection);
        }

        let mut state = self.connect_lock.lock().await;
        if let Some(connection) = self.current().await {
            return Ok(connection);
        }
        if let Some(err) = self.failure_since(&state, observed) {
            return Err(err);
        }
        self.connect_locked(&mut state).await
    }

    /// Replace a handle that failed at `stale_generation`.
    ///
    /// When another caller already reconnected, its handle is returned as is;
    /// when another caller's loop failed meanwhile, its error is.
    pub async fn reconnect(&self, stale_generation: u64) -> ContractResult<Connection<C::Index>> {
        let observed = self.finished_loops.load(Ordering::SeqCst);
        let mut state = self.connect_lock.lock().await;
        match self.current().await {
            Some(connection) if connection.generation != stale_generation => {
                return Ok(connection);
            }
            _ => {}
        }
        if let Some(err) = self.failure_since(&state, observed) {
            return Err(err);
        }
        self.connect_locked(&mut state).await
    }

    pub async fn current(&self) -> Option<Connection<C::Index>> {
        self.current.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Failed attempts since the last successful connect
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.max_attempts
    }

    /// Forget the current handle. The next operation reconnects.
    pub async fn close(&self) {
        if self.current.write().await.take().is_some() {
            info!("Vector index connection closed");
        }
    }

    /// Error of a loop that finished after `observed` was read, if it failed.
    fn failure_since(&self, state: &ConnectState, observed: u64) -> Option<ContractError> {
        if self.finished_loops.load(Ordering::SeqCst) == observed {
            return None;
        }
        state
            .last_error
            .clone()
            .map(ContractError::ServiceUnavailable)
    }

    async fn connect_locked(
        &self,
        state: &mut ConnectState,
    ) -> ContractResult<Connection<C::Index>> {
        *self.current.write().await = None;

        let outcome = retry_fixed(|attempt| self.try_open(attempt), &self.retry).await;
        let result = match outcome {
            Ok((index, total_vectors)) => {
                state.generation += 1;
                state.last_error = None;
                let connection = Connection {
                    index: Arc::new(index),
                    generation: state.generation,
                    total_vectors,
                };
                *self.current.write().await = Some(connection.clone());
                Ok(connection)
            }
            Err(e) => {
                let message = format!(
                    "could not connect to the vector index after {} attempts: {}",
                    self.retry.max_attempts, e
                );
                state.last_error = Some(message.clone());
                Err(ContractError::ServiceUnavailable(message))
            }
        };

        self.finished_loops.fetch_add(1, Ordering::SeqCst);
        result
    }

    /// One attempt: open a handle and verify it with a stats probe.
    async fn try_open(&self, attempt: u32) -> Result<(C::Index, u64), String> {
        let result = async {
            let index = timeout(self.call_timeout, self.connector.open())
                .await
                .map_err(|_| format!("open timed out after {:?}", self.call_timeout))?
                .map_err(|e| e.to_string())?;
            let stats = timeout(self.call_timeout, index.stats())
                .await
                .map_err(|_| format!("stats probe timed out after {:?}", self.call_timeout))?
                .map_err(|e| e.to_string())?;
            Ok::<_, String>((index, stats))
        }
        .await;

        match result {
            Ok((index, stats)) => {
                self.consecutive_failures.store(0, Ordering::SeqCst);
                info!(
                    total_vectors = stats.total_vector_count,
                    "Connected to vector index"
                );
                if let Some(dimension) = stats
                    .dimension
                    .filter(|d| *d as usize != EMBEDDING_DIMENSION)
                {
                    warn!(
                        dimension,
                        expected = EMBEDDING_DIMENSION,
                        "Vector index dimension does not match the embedding size"
                    );
                }
                Ok((index, stats.total_vector_count))
            }
            Err(e) => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    attempt,
                    max_attempts = self.retry.max_attempts,
                    consecutive_failures = failures,
                    error = %e,
                    "Vector index connection attempt failed"
                );
                Err(e)
            }
        }
    }
}
