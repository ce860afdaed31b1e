#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse, env_required};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_INDEX_NAME: &str = "brito-ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Pinecone index configuration
///
/// When `host` is `None` the data-plane host is looked up through the control
/// plane (`GET {control_url}/indexes/{index_name}`) on every connect.
///
/// # Example
///
/// ```ignore
/// use database::pinecone::PineconeConfig;
///
/// let config = PineconeConfig::new("pc-key", "brito-ai")
///     .with_host("brito-ai-abc123.svc.aped-4627-b74a.pinecone.io");
/// let index = database::pinecone::connect(&config).await?;
/// ```
#[derive(Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_name: String,
    pub host: Option<String>,
    pub control_url: String,
    pub namespace: Option<String>,
    pub timeout_secs: u64,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_name: index_name.into(),
            host: None,
            control_url: DEFAULT_CONTROL_URL.to_string(),
            namespace: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_control_url(mut self, control_url: impl Into<String>) -> Self {
        self.control_url = control_url.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// api_key stays out of logs
impl fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &"<redacted>")
            .field("index_name", &self.index_name)
            .field("host", &self.host)
            .field("control_url", &self.control_url)
            .field("namespace", &self.namespace)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Load PineconeConfig from environment variables
///
/// - `PINECONE_API_KEY` (required)
/// - `PINECONE_INDEX_NAME` (default `brito-ai`)
/// - `PINECONE_HOST` (optional, resolved through the control plane when unset)
/// - `PINECONE_CONTROL_URL` (default `https://api.pinecone.io`)
/// - `PINECONE_NAMESPACE` (optional)
/// - `PINECONE_TIMEOUT_SECS` (default 5)
#[cfg(feature = "config")]
impl FromEnv for PineconeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("PINECONE_API_KEY")?,
            index_name: env_or_default("PINECONE_INDEX_NAME", DEFAULT_INDEX_NAME),
            host: env_optional("PINECONE_HOST"),
            control_url: env_or_default("PINECONE_CONTROL_URL", DEFAULT_CONTROL_URL),
            namespace: env_optional("PINECONE_NAMESPACE"),
            timeout_secs: env_parse("PINECONE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}
