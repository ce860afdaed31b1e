use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::PineconeConfig;
use super::models::{IndexDescription, IndexStats, MAX_TOP_K, QueryRequest, QueryResponse};
use crate::common::{DatabaseError, DatabaseResult};

const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const API_VERSION: &str = "2025-04";

/// Open a handle to a Pinecone index.
///
/// Builds the HTTP client and resolves the data-plane host (through the
/// control plane when `config.host` is unset). No data-plane call is made;
/// use [`PineconeIndex::describe_index_stats`] to verify liveness.
///
/// # Example
/// ```ignore
/// use database::pinecone::{PineconeConfig, connect};
///
/// let index = connect(&PineconeConfig::new(api_key, "brito-ai")).await?;
/// let stats = index.describe_index_stats().await?;
/// ```
pub async fn connect(config: &PineconeConfig) -> DatabaseResult<PineconeIndex> {
    let client = Client::builder().timeout(config.timeout()).build()?;

    let host = match &config.host {
        Some(host) => host.clone(),
        None => resolve_host(&client, config).await?,
    };
    let base_url = normalize_host(&host);

    info!(index = %config.index_name, host = %base_url, "Opened Pinecone index handle");

    Ok(PineconeIndex {
        client,
        base_url,
        api_key: config.api_key.clone(),
        namespace: config.namespace.clone(),
    })
}

/// Look up the data-plane host for `config.index_name`.
pub async fn resolve_host(client: &Client, config: &PineconeConfig) -> DatabaseResult<String> {
    let url = format!(
        "{}/indexes/{}",
        config.control_url.trim_end_matches('/'),
        config.index_name
    );
    debug!(%url, "Resolving Pinecone index host");

    let request = client
        .get(&url)
        .header("Api-Key", &config.api_key)
        .header(API_VERSION_HEADER, API_VERSION);
    let description: IndexDescription = send_json(request, "describe_index").await?;

    if description.host.trim().is_empty() {
        return Err(DatabaseError::ConnectionFailed(format!(
            "index '{}' has no host yet",
            description.name
        )));
    }
    Ok(description.host)
}

/// Hosts from the control plane come without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    operation: &'static str,
) -> DatabaseResult<T> {
    let response = request.send().await?;
    let response = ensure_success(response, operation).await?;
    Ok(response.json::<T>().await?)
}

async fn ensure_success(response: Response, operation: &'static str) -> DatabaseResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DatabaseError::UnexpectedStatus {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Handle to one Pinecone index data plane.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct PineconeIndex {
    client: Client,
    base_url: String,
    api_key: String,
    namespace: Option<String>,
}

impl PineconeIndex {
    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("Api-Key", &self.api_key)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Index statistics; the cheap call used as the liveness probe.
    pub async fn describe_index_stats(&self) -> DatabaseResult<IndexStats> {
        let request = self.post("/describe_index_stats").json(&serde_json::json!({}));
        send_json(request, "describe_index_stats").await
    }

    /// Nearest-neighbour query.
    ///
    /// The handle's namespace applies when the request names none, and
    /// `top_k` is clamped to [`MAX_TOP_K`].
    pub async fn query(&self, mut request: QueryRequest) -> DatabaseResult<QueryResponse> {
        if request.namespace.is_none() {
            request.namespace = self.namespace.clone();
        }
        request.top_k = request.top_k.min(MAX_TOP_K);

        debug!(top_k = request.top_k, "Querying Pinecone index");
        send_json(self.post("/query").json(&request), "query").await
    }
}
