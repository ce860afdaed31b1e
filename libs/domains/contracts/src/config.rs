use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use database::RetryConfig;
use std::time::Duration;

/// Gateway tuning knobs
///
/// - `MAX_RECONNECT_ATTEMPTS` (default 3): connect tries per reconnect cycle
/// - `RECONNECT_DELAY_SECS` (default 2): flat wait between tries
/// - `GATEWAY_CALL_TIMEOUT_SECS` (default 5): bound on each embedding/index call
/// - `DISTINCT_FILES_CAP` (default 1000): probe size for distinct filenames
/// - `CONTRACT_FILE_FIELD` / `CONTRACT_TEXT_FIELD` (default `file` / `text`)
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
    pub call_timeout: Duration,
    pub distinct_files_cap: u32,
    pub fields: MetadataFields,
}

impl GatewayConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(self.max_reconnect_attempts, self.reconnect_delay)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 3,
            reconnect_delay: Duration::from_secs(2),
            call_timeout: Duration::from_secs(5),
            distinct_files_cap: 1000,
            fields: MetadataFields::default(),
        }
    }
}

impl FromEnv for GatewayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_reconnect_attempts: env_parse(
                "MAX_RECONNECT_ATTEMPTS",
                defaults.max_reconnect_attempts,
            )?,
            reconnect_delay: Duration::from_secs(env_parse("RECONNECT_DELAY_SECS", 2u64)?),
            call_timeout: Duration::from_secs(non_zero(
                "GATEWAY_CALL_TIMEOUT_SECS",
                env_parse("GATEWAY_CALL_TIMEOUT_SECS", 5u64)?,
            )?),
            distinct_files_cap: non_zero(
                "DISTINCT_FILES_CAP",
                env_parse("DISTINCT_FILES_CAP", defaults.distinct_files_cap)?,
            )?,
            fields: MetadataFields::from_env()?,
        })
    }
}

fn non_zero<T: Into<u64> + Copy>(key: &str, value: T) -> Result<T, ConfigError> {
    if value.into() == 0 {
        return Err(ConfigError::ParseError {
            key: key.to_string(),
            details: "must be greater than 0".to_string(),
        });
    }
    Ok(value)
}

/// Metadata keys holding the source filename and chunk text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFields {
    pub file: String,
    pub text: String,
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self {
            file: "file".to_string(),
            text: "text".to_string(),
        }
    }
}

impl FromEnv for MetadataFields {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            file: env_or_default("CONTRACT_FILE_FIELD", "file"),
            text: env_or_default("CONTRACT_TEXT_FIELD", "text"),
        })
    }
}
