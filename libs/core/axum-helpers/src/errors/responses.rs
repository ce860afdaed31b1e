//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error - upstream embedding or index failure",
    content_type = "application/json",
    example = json!({
        "code": 2002,
        "error": "QUERY_FAILED",
        "message": "query returned 502 Bad Gateway",
        "details": null
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - missing or invalid query parameter",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "INVALID_ARGUMENT",
        "message": "query must not be empty",
        "details": null
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable - vector index unreachable",
    content_type = "application/json",
    example = json!({
        "code": 1011,
        "error": "SERVICE_UNAVAILABLE",
        "message": "could not connect to the vector index",
        "details": null
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
