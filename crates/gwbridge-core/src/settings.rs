//! Bridge settings and validation.
//!
//! Settings are assembled once at start-up (CLI flags, environment, `.env`)
//! and then shared read-only.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

/// Default gateway base URL.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8935";

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for non-streaming gateway calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connect timeout applied to every gateway call.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Pipeline served by the bridge.
pub const LLM_PIPELINE: &str = "llm-generate";

/// Model the gateway runs for [`LLM_PIPELINE`] when none is requested.
pub const DEFAULT_LLM_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// The static pipeline -> default model mapping.
pub fn default_models() -> BTreeMap<String, String> {
    BTreeMap::from([(LLM_PIPELINE.to_string(), DEFAULT_LLM_MODEL.to_string())])
}

/// Errors raised by [`validate_settings`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Gateway URL must not be empty")]
    EmptyGatewayUrl,

    #[error("Gateway URL must start with http:// or https://, got '{0}'")]
    InvalidGatewayScheme(String),

    #[error("Port must be non-zero")]
    InvalidPort,

    #[error("Timeout must be at least one second")]
    InvalidTimeout,
}

/// Runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Gateway base URL without trailing slash.
    pub gateway_url: String,
    pub host: String,
    pub port: u16,
    /// Whole-request timeout for non-streaming gateway calls.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Pipeline name -> default model id, served by `/v1/models`.
    pub default_models: BTreeMap<String, String>,
    /// Accepted API keys. Empty disables authentication.
    pub api_keys: Vec<String>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            default_models: default_models(),
            api_keys: Vec::new(),
        }
    }
}

impl BridgeSettings {
    /// Set the gateway URL, dropping any trailing slashes.
    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the generation endpoint.
    pub fn generate_url(&self) -> String {
        format!("{}/{LLM_PIPELINE}", self.gateway_url)
    }

    /// Whether requests must carry an API key.
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }
}

/// Validate settings before the server binds.
pub fn validate_settings(settings: &BridgeSettings) -> Result<(), SettingsError> {
    if settings.gateway_url.is_empty() {
        return Err(SettingsError::EmptyGatewayUrl);
    }
    if !(settings.gateway_url.starts_with("http://") || settings.gateway_url.starts_with("https://"))
    {
        return Err(SettingsError::InvalidGatewayScheme(
            settings.gateway_url.clone(),
        ));
    }
    if settings.port == 0 {
        return Err(SettingsError::InvalidPort);
    }
    if settings.request_timeout.as_secs() == 0 {
        return Err(SettingsError::InvalidTimeout);
    }
    Ok(())
}
