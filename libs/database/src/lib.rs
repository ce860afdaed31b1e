//! Vector-store connectors and connection utilities
//!
//! # Features
//!
//! - `pinecone` (default) - Pinecone REST data-plane connector
//! - `config` - Configuration support with `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::common::{RetryConfig, retry_fixed};
//! use database::pinecone::{self, PineconeConfig, QueryRequest};
//!
//! let config = PineconeConfig::new(api_key, "brito-ai");
//! let index = retry_fixed(|_| pinecone::connect(&config), &RetryConfig::default()).await?;
//!
//! let stats = index.describe_index_stats().await?;
//! let matches = index.query(QueryRequest::with_metadata(vector, 5)).await?;
//! ```

pub mod common;

#[cfg(feature = "pinecone")]
pub mod pinecone;

pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry_fixed};
