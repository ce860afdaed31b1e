use axum::extract::rejection::QueryRejection;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use core_config::ConfigError;
use thiserror::Error;

/// Failure kinds surfaced by the query gateway
#[derive(Debug, Error)]
pub enum ContractError {
    /// Bad caller input; never retried
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No live index handle and the bounded reconnect loop gave up
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Embedding provider error; not retried locally
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// Index call failed even after the single reconnect-and-replay cycle
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ContractResult<T> = Result<T, ContractError>;

impl From<ConfigError> for ContractError {
    fn from(err: ConfigError) -> Self {
        ContractError::Config(err.to_string())
    }
}

impl From<QueryRejection> for ContractError {
    fn from(rejection: QueryRejection) -> Self {
        ContractError::InvalidArgument(rejection.body_text())
    }
}

/// Convert ContractError to AppError for standardized HTTP error responses
impl From<ContractError> for AppError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::InvalidArgument(msg) => AppError::BadRequest(msg),
            ContractError::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ContractError::EmbeddingFailed(msg) => AppError::EmbeddingFailed(msg),
            ContractError::QueryFailed(msg) => AppError::QueryFailed(msg),
            ContractError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
        }
    }
}

impl IntoResponse for ContractError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
