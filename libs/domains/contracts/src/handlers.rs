use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    HealthCheckFuture,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse,
    },
    run_health_checks,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ContractResult;
use crate::models::{
    FileList, HealthReport, IndexStatus, ListParams, SearchHit, SearchParams, SearchResult,
    ServiceStatus,
};
use crate::repository::IndexConnector;
use crate::service::ContractService;

const TAG: &str = "contratos";

/// OpenAPI documentation for the contract search API
#[derive(OpenApi)]
#[openapi(
    paths(health, list_contracts, search_contracts, list_files),
    components(
        schemas(HealthReport, ServiceStatus, IndexStatus, SearchHit, SearchResult, FileList),
        responses(BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse)
    ),
    tags(
        (name = TAG, description = "Semantic search over indexed contracts")
    )
)]
pub struct ContractsApiDoc;

/// Create the contract router: service health, readiness and the three query endpoints
pub fn router<C: IndexConnector + 'static>(service: ContractService<C>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
        .route("/contratos", get(list_contracts))
        .route("/contratos/busca", get(search_contracts))
        .route("/contratos/arquivos", get(list_files))
        .with_state(shared_service)
}

/// Service status and vector index connectivity
///
/// Always answers 200; a missing or failing index shows up as
/// `partial` or `degraded`.
#[utoipa::path(
    get,
    path = "/",
    tag = TAG,
    responses(
        (status = 200, description = "Service status", body = HealthReport)
    )
)]
async fn health<C: IndexConnector + 'static>(
    State(service): State<Arc<ContractService<C>>>,
) -> Json<HealthReport> {
    Json(service.health().await)
}

/// Readiness probe: 503 while the vector index is unreachable
async fn ready<C: IndexConnector + 'static>(
    State(service): State<Arc<ContractService<C>>>,
) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> =
        vec![("vector_index", Box::pin(service.check_ready()))];
    run_health_checks(checks).await
}

/// List indexed contract chunks
///
/// `total` is the number of vectors in the index.
#[utoipa::path(
    get,
    path = "/contratos",
    tag = TAG,
    params(ListParams),
    responses(
        (status = 200, description = "Page of contract chunks", body = SearchResult),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_contracts<C: IndexConnector + 'static>(
    State(service): State<Arc<ContractService<C>>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ContractResult<Json<SearchResult>> {
    let Query(params) = params?;
    let result = service.list(params.skip, params.limit).await?;
    Ok(Json(result))
}

/// Semantic search over contract chunks
#[utoipa::path(
    get,
    path = "/contratos/busca",
    tag = TAG,
    params(SearchParams),
    responses(
        (status = 200, description = "Most similar chunks, best first", body = SearchResult),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_contracts<C: IndexConnector + 'static>(
    State(service): State<Arc<ContractService<C>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ContractResult<Json<SearchResult>> {
    let Query(params) = params?;
    let query = params.q.unwrap_or_default();
    let result = service.search(&query, params.limit).await?;
    Ok(Json(result))
}

/// Distinct source filenames
#[utoipa::path(
    get,
    path = "/contratos/arquivos",
    tag = TAG,
    responses(
        (status = 200, description = "Sorted distinct filenames", body = FileList),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_files<C: IndexConnector + 'static>(
    State(service): State<Arc<ContractService<C>>>,
) -> ContractResult<Json<FileList>> {
    let files = service.distinct_files().await?;
    Ok(Json(files))
}
