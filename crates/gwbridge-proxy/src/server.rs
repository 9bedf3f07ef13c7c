//! Axum HTTP server for the bridge.
//!
//! This module provides the router and the `serve()` function that runs it
//! on a pre-bound `TcpListener`.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_api_key;
use crate::handlers::{
    chat_completions, completions_not_implemented, embeddings_not_implemented, health_check,
    list_models,
};
use crate::state::AppState;

/// Build the router.
///
/// `/health`, `/v1/models` and `/v1/embeddings` are open. The completion
/// routes sit behind [`require_api_key`].
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/completions", post(completions_not_implemented))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/models", get(list_models))
        .route("/v1/embeddings", post(embeddings_not_implemented))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the bridge with a pre-bound listener.
///
/// Runs until `cancel` is triggered, then stops accepting connections and
/// lets in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        auth_enabled = state.key_store.is_some(),
        "Bridge server starting on {addr}"
    );

    let app = create_router(state);

    info!("Point OpenAI clients at: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Bridge server shut down");
    Ok(())
}
