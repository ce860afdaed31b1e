//! Pinecone vector index connector
//!
//! Thin REST client for the data-plane calls the gateway needs: index
//! statistics and nearest-neighbour queries. Index host discovery goes
//! through the control plane when no host is configured.

mod config;
mod connector;
pub mod models;

pub use config::{DEFAULT_CONTROL_URL, DEFAULT_INDEX_NAME, DEFAULT_TIMEOUT_SECS, PineconeConfig};
pub use connector::{PineconeIndex, connect, resolve_host};
pub use models::{IndexStats, MAX_TOP_K, QueryRequest, QueryResponse, ScoredVector};
