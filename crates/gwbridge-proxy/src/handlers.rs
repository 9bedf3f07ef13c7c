//! Route handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use gwbridge_core::translate::{spawn_stream_translator, translate_request, translate_sync_body};
use gwbridge_core::{ChatRequest, GatewayBody, GatewayRequest, ModelsResponse};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::relay::relay_body;
use crate::state::AppState;
use crate::usage::UsageRecorder;

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Pipelines the gateway serves and their default models.
pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /v1/models");
    Json(ModelsResponse {
        models: state.models.as_ref().clone(),
    })
}

/// `POST /v1/chat/completions`
pub async fn chat_completions(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Response {
    match handle_chat(state, caller, body).await {
        Ok(response) => response,
        Err(err) => {
            if err.status.is_server_error() {
                error!(status = %err.status, "Chat completion failed: {}", err.body.error.message);
            } else {
                debug!(status = %err.status, "Chat completion rejected: {}", err.body.error.message);
            }
            err.into_response()
        }
    }
}

async fn handle_chat(state: AppState, caller: Caller, body: Bytes) -> Result<Response, ApiError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let gateway_request = translate_request(&request)?;

    info!(
        model = %gateway_request.model_name(),
        messages = request.messages.len(),
        streaming = gateway_request.stream,
        "Processing chat completion request"
    );

    let usage = UsageRecorder::new(state.key_store.clone(), &caller);
    let reply = state.gateway.generate(&gateway_request).await?;

    if gateway_request.stream {
        let body = reply.into_success().await?;
        Ok(stream_response(&state, &gateway_request, body, usage))
    } else {
        let bytes = reply.into_success_bytes().await?;
        let response = translate_sync_body(&gateway_request, &bytes, state.ids.as_ref())?;
        usage.record(response.usage.total_tokens);
        Ok(Json(response).into_response())
    }
}

fn stream_response(
    state: &AppState,
    request: &GatewayRequest,
    body: GatewayBody,
    usage: UsageRecorder,
) -> Response {
    let cancel = CancellationToken::new();
    let translated = spawn_stream_translator(
        body,
        request.model_name(),
        state.ids.as_ref(),
        cancel.clone(),
    );
    debug!(id = %translated.id, "Relaying gateway stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(relay_body(translated, usage, cancel)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Legacy completions are not offered by the gateway.
pub async fn completions_not_implemented() -> ApiError {
    ApiError::not_implemented("/v1/completions")
}

pub async fn embeddings_not_implemented() -> ApiError {
    ApiError::not_implemented("/v1/embeddings")
}
