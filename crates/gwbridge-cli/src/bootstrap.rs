//! Composition root: builds the gateway client and key store, binds the
//! listener and runs the server until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use gwbridge_core::{BridgeSettings, InMemoryKeyStore, validate_settings};
use gwbridge_proxy::{AppState, HttpGateway, serve};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Load a `.env` file from the working directory, if there is one.
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wire the server state from validated settings.
pub fn build_state(settings: &BridgeSettings) -> anyhow::Result<AppState> {
    let gateway = HttpGateway::new(settings).context("Failed to build gateway client")?;
    info!(url = %gateway.generate_url(), "Using gateway");

    let mut state = AppState::new(Arc::new(gateway)).with_models(settings.default_models.clone());

    if settings.auth_enabled() {
        let store = InMemoryKeyStore::new(settings.api_keys.iter().cloned());
        info!(keys = store.len(), "API key authentication enabled");
        state = state.with_key_store(Arc::new(store));
    } else {
        warn!("No API keys configured; authentication is disabled");
    }

    Ok(state)
}

/// Run the bridge until Ctrl-C.
pub async fn run(settings: BridgeSettings) -> anyhow::Result<()> {
    validate_settings(&settings)?;
    let state = build_state(&settings)?;

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.host, settings.port))?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
        shutdown.cancel();
    });

    serve(listener, state, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_without_keys_is_open() {
        let state = build_state(&BridgeSettings::default()).unwrap();
        assert!(state.key_store.is_none());
        assert!(state.models.contains_key("llm-generate"));
    }

    #[test]
    fn test_state_with_keys_is_protected() {
        let settings = BridgeSettings {
            api_keys: vec!["secret".into()],
            ..BridgeSettings::default()
        };
        let state = build_state(&settings).unwrap();
        assert!(state.key_store.is_some());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_settings() {
        let settings = BridgeSettings::default().with_gateway_url("ftp://gateway");
        let err = run(settings).await.unwrap_err();
        assert!(err.to_string().contains("http://"));
    }
}
