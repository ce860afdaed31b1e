use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::pinecone::PineconeConfig;
use domain_contracts::{GatewayConfig, OpenAIConfig};

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub pinecone: PineconeConfig,
    pub openai: OpenAIConfig,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8000
        let pinecone = PineconeConfig::from_env()?; // PINECONE_API_KEY required
        let openai = OpenAIConfig::from_env()?; // OPENAI_API_KEY required
        let gateway = GatewayConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            pinecone,
            openai,
            gateway,
        })
    }
}
