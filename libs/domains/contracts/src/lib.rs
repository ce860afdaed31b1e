//! Contracts Domain Library
//!
//! Read-only semantic search over contract chunks stored in a vector index,
//! with query embeddings generated on the fly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ContractService  │  ← search / list / distinct files, reconnect-and-replay once
//! └────────┬─────────┘
//!          │
//! ┌────────▼──────────┐     ┌───────────────────┐
//! │ ConnectionManager │     │ EmbeddingProvider │
//! │ (bounded connect) │     │     (trait)       │
//! └────────┬──────────┘     └────────┬──────────┘
//!          │                         │
//! ┌────────▼──────────┐     ┌────────▼──────────┐
//! │  IndexConnector   │     │  OpenAIProvider   │
//! │  ContractIndex    │     └───────────────────┘
//! │  (Pinecone,       │
//! │   in-memory)      │
//! └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_contracts::{
//!     ContractService, GatewayConfig, OpenAIConfig, OpenAIProvider, PineconeConnector,
//! };
//! use core_config::FromEnv;
//! use database::pinecone::PineconeConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayConfig::from_env()?;
//! let connector = PineconeConnector::new(PineconeConfig::from_env()?, gateway.fields.clone());
//! let embeddings = Arc::new(OpenAIProvider::new(OpenAIConfig::from_env()?)?);
//!
//! let service = ContractService::new(connector, embeddings, gateway);
//! let result = service.search("multa por rescisão antecipada", 5).await?;
//! for hit in result.hits {
//!     println!("{} ({:.3})", hit.file, hit.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pinecone;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use config::{GatewayConfig, MetadataFields};
pub use connection::{Connection, ConnectionManager};
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{ContractError, ContractResult};
pub use handlers::ContractsApiDoc;
pub use models::{
    DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, EMBEDDING_DIMENSION, EmbeddingVector, FileList,
    HealthReport, IndexMatch, IndexStatistics, IndexStatus, ListParams, SearchHit, SearchParams,
    SearchResult, ServiceStatus,
};
pub use pinecone::{PineconeConnector, PineconeContractIndex};
pub use repository::{
    ContractIndex, InMemoryConnector, InMemoryContractIndex, IndexConnector, StoredVector,
};
pub use service::ContractService;
