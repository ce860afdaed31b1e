/// Unified error type for vector-store connector operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Transport-level failure talking to the Pinecone REST API
    #[cfg(feature = "pinecone")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{operation} returned {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
