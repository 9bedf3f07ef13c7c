//! Gateway wire types.
//!
//! The gateway's `/llm-generate` endpoint takes a multipart form and answers
//! either with a single JSON body or with an SSE stream of chunks.

use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_LLM_MODEL;

/// Outbound generation request, one multipart field per populated member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Model to run; `None` lets the gateway pick its pipeline default.
    pub model_id: Option<String>,
    /// The current user turn.
    pub prompt: String,
    /// First message of a multi-turn conversation.
    pub system_msg: Option<String>,
    /// JSON array of `"role: content"` strings for the middle turns.
    pub history: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub stream: bool,
}

impl GatewayRequest {
    /// Multipart form fields in the order they are written on the wire.
    ///
    /// Absent optionals produce no field at all so the gateway applies its
    /// own defaults.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("prompt", self.prompt.clone())];
        if let Some(model_id) = &self.model_id {
            fields.push(("model_id", model_id.clone()));
        }
        if let Some(system_msg) = &self.system_msg {
            fields.push(("system_msg", system_msg.clone()));
        }
        if let Some(history) = &self.history {
            fields.push(("history", history.clone()));
        }
        if let Some(max_tokens) = self.max_tokens {
            fields.push(("max_tokens", max_tokens.to_string()));
        }
        if let Some(temperature) = self.temperature {
            fields.push(("temperature", temperature.to_string()));
        }
        fields.push(("stream", self.stream.to_string()));
        fields
    }

    /// Model name echoed back in OpenAI replies. Without an explicit model
    /// the gateway runs the `llm-generate` pipeline default.
    pub fn model_name(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_LLM_MODEL)
    }
}

/// Buffered (non-streaming) gateway reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySyncResult {
    pub response: String,
    /// Already includes prompt tokens.
    #[serde(default)]
    pub tokens_used: u32,
}

/// One `data:` event of the gateway's SSE stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStreamChunk {
    #[serde(default)]
    pub chunk: String,
    /// Tokens attributable to this chunk only.
    #[serde(default)]
    pub tokens_used: u32,
    #[serde(default)]
    pub done: bool,
}
