use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_contracts::{
    ContractService, EmbeddingProvider, OpenAIProvider, PineconeConnector, handlers,
};
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(index = %config.pinecone.index_name, "Starting contract search API");

    let embeddings = Arc::new(OpenAIProvider::new(config.openai.clone())?);
    info!(model = embeddings.model(), "Query embeddings provider ready");
    let connector = PineconeConnector::new(config.pinecone.clone(), config.gateway.fields.clone());
    let service = ContractService::new(connector, embeddings, config.gateway.clone());

    // Eager connect; requests reconnect lazily if the index is down right now
    match service.connect().await {
        Ok(total_vectors) => info!(total_vectors, "Vector index ready"),
        Err(e) => warn!("Starting without a vector index connection: {}", e),
    }

    // - /, /ready, /contratos*: contract routes
    // - /health: liveness check with app name/version
    let api_routes = handlers::router(service.clone()).merge(health_router(config.app));

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes).await?;

    create_production_app(
        router,
        &config.server,
        config.server.shutdown_timeout(),
        async move {
            info!("Shutting down: closing vector index connection");
            service.close().await;
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Contratus API shutdown complete");
    Ok(())
}
