//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Prefix for environment overrides, e.g. `TRANSLATOR_PORT`
const ENV_PREFIX: &str = "TRANSLATOR";

/// Optional config file, any format the `config` crate understands
const CONFIG_FILE: &str = "translator";

/// Configuration for the translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_config_path: PathBuf,
    pub model_weights_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_config_path: PathBuf::from("models/tradutor_config.json"),
            model_weights_path: PathBuf::from("models/tradutor_pesos.safetensors"),
        }
    }
}

/// Upper bound on remote retries
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Configuration for the remote client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            max_retries: 3,
            retry_delay_ms: 500,
            timeout_ms: 30000,
        }
    }
}

/// Every setting the binary reads, grouped by component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load defaults, then `translator.*` if present, then `TRANSLATOR_*` env vars.
    ///
    /// Nested keys use a double underscore: `TRANSLATOR_SERVICE__PORT=8080`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same layering as [`AppConfig::load`] with an explicit file stem
    pub fn load_from(file: &str) -> anyhow::Result<Self> {
        let service = ServiceConfig::default();
        let client = ClientConfig::default();

        let settings = config::Config::builder()
            .set_default("service.host", service.host)?
            .set_default("service.port", i64::from(service.port))?
            .set_default(
                "service.model_config_path",
                service.model_config_path.to_string_lossy().to_string(),
            )?
            .set_default(
                "service.model_weights_path",
                service.model_weights_path.to_string_lossy().to_string(),
            )?
            .set_default("client.endpoint", client.endpoint)?
            .set_default("client.max_retries", i64::from(client.max_retries))?
            .set_default("client.retry_delay_ms", client.retry_delay_ms as i64)?
            .set_default("client.timeout_ms", client.timeout_ms as i64)?
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        info!(
            "Loaded configuration (model config: {}, weights: {})",
            config.service.model_config_path.display(),
            config.service.model_weights_path.display()
        );
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.service.validate()?;
        self.client.validate()
    }
}

impl ServiceConfig {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow::anyhow!("host is required"));
        }

        if self.model_config_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("model_config_path is required"));
        }

        if self.model_weights_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("model_weights_path is required"));
        }

        Ok(())
    }

    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow::anyhow!("client endpoint is required"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(anyhow::anyhow!(
                "max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            ));
        }

        Ok(())
    }
}
