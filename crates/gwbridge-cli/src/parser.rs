//! Command-line flags. Every flag can also come from the environment.

use std::time::Duration;

use clap::Parser;
use gwbridge_core::{
    BridgeSettings, DEFAULT_GATEWAY_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};

/// OpenAI-compatible bridge in front of a generation gateway.
#[derive(Debug, Parser)]
#[command(name = "gwbridge")]
#[command(about = "Serve the OpenAI chat API on top of a gateway's /llm-generate endpoint")]
#[command(version)]
pub struct Cli {
    /// Gateway base URL
    #[arg(long = "gateway", env = "GWBRIDGE_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Address to listen on
    #[arg(long, env = "GWBRIDGE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short = 'p', long, env = "GWBRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Accepted API key (repeatable, or comma-separated in the env var).
    /// Without any key, authentication is disabled.
    #[arg(
        long = "api-key",
        env = "GWBRIDGE_API_KEYS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub api_keys: Vec<String>,

    /// Timeout for non-streaming gateway calls, in seconds
    #[arg(long = "timeout-secs", env = "GWBRIDGE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    pub fn into_settings(self) -> BridgeSettings {
        BridgeSettings {
            host: self.host,
            port: self.port,
            request_timeout: Duration::from_secs(self.timeout_secs),
            api_keys: self
                .api_keys
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            ..BridgeSettings::default()
        }
        .with_gateway_url(self.gateway_url)
    }
}
