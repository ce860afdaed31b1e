use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Contratus API",
        version = "0.1.0",
        description = "Semantic search over indexed contracts"
    ),
    nest(
        (path = "", api = domain_contracts::ContractsApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_paths_are_served_from_root() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/contratos", "/contratos/busca", "/contratos/arquivos"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
