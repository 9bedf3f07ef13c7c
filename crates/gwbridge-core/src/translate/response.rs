//! Buffered gateway reply -> `chat.completion`.

use crate::domain::{ChatCompletionResponse, GatewayRequest, GatewaySyncResult, Usage};
use crate::error::CoreError;
use crate::ids::IdGenerator;

use super::unix_now;

/// Parse a gateway sync body.
///
/// # Errors
///
/// Returns [`CoreError::Decode`] when the body is not a `GatewaySyncResult`.
pub fn decode_sync_result(body: &[u8]) -> Result<GatewaySyncResult, CoreError> {
    serde_json::from_slice(body).map_err(|e| CoreError::Decode(e.to_string()))
}

/// Wrap a decoded gateway reply in the OpenAI envelope.
///
/// `tokens_used` is copied verbatim into `usage.total_tokens`: the gateway
/// already counts the prompt.
pub fn translate_response(
    request: &GatewayRequest,
    result: GatewaySyncResult,
    ids: &dyn IdGenerator,
) -> ChatCompletionResponse {
    ChatCompletionResponse::assistant(
        ids.next_id(),
        unix_now(),
        request.model_name().to_string(),
        result.response,
        Usage::total(result.tokens_used),
    )
}

/// Decode and translate in one step.
pub fn translate_sync_body(
    request: &GatewayRequest,
    body: &[u8],
    ids: &dyn IdGenerator,
) -> Result<ChatCompletionResponse, CoreError> {
    let result = decode_sync_result(body)?;
    Ok(translate_response(request, result, ids))
}
