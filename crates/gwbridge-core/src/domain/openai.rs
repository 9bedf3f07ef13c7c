//! OpenAI chat-completion data models.
//!
//! Field names and nesting follow the public OpenAI schema so that replies
//! serialize byte-for-byte the way OpenAI clients expect.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Finish reason written on the single terminal choice.
///
/// The gateway contract has no other terminal condition, so this is the only
/// non-empty value the bridge ever emits.
pub const FINISH_REASON_STOP: &str = "stop";

const OBJECT_COMPLETION: &str = "chat.completion";
const OBJECT_CHUNK: &str = "chat.completion.chunk";

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message.
///
/// `content` must be present in the JSON but may be the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request to `/v1/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Model name; forwarded to the gateway as `model_id` when non-empty.
    #[serde(default)]
    pub model: String,
    /// Conversation turns, oldest first. The last one is the current prompt.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0-2).
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Whether to stream the response as SSE.
    #[serde(default)]
    pub stream: bool,

    // Accepted so that stock OpenAI clients validate, but the gateway has no
    // equivalent knobs.
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub n: Option<u32>,
    #[serde(default)]
    pub stop: Option<serde_json::Value>,
    #[serde(default)]
    pub presence_penalty: Option<f32>,
    #[serde(default)]
    pub frequency_penalty: Option<f32>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Token usage statistics.
///
/// Only `total_tokens` carries information: the gateway reports a single
/// figure that already includes the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Usage block carrying only a total.
    #[must_use]
    pub const fn total(total_tokens: u32) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens,
        }
    }
}

/// Response from `/v1/chat/completions` (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Build the single-choice assistant reply.
    pub fn assistant(
        id: String,
        created: i64,
        model: String,
        content: String,
        usage: Usage,
    ) -> Self {
        Self {
            id,
            object: OBJECT_COMPLETION.to_string(),
            created,
            model,
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::new(Role::Assistant, content),
                finish_reason: FINISH_REASON_STOP.to_string(),
            }],
            usage,
        }
    }
}

/// A single chat completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// Streaming chunk from `/v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    /// Present only on the terminal chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionChunk {
    /// A content-carrying chunk with an empty finish reason.
    pub fn delta(id: String, created: i64, model: String, content: String) -> Self {
        Self {
            id,
            object: OBJECT_CHUNK.to_string(),
            created,
            model,
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta { content },
                finish_reason: String::new(),
            }],
            usage: None,
        }
    }

    /// The closing chunk: `finish_reason = "stop"` and the stream's usage.
    pub fn terminal(id: String, created: i64, model: String, usage: Usage) -> Self {
        Self {
            id,
            object: OBJECT_CHUNK.to_string(),
            created,
            model,
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    content: String::new(),
                },
                finish_reason: FINISH_REASON_STOP.to_string(),
            }],
            usage: Some(usage),
        }
    }

    /// Whether this chunk closes its stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.usage.is_some()
            && self
                .choices
                .first()
                .is_some_and(|c| c.finish_reason == FINISH_REASON_STOP)
    }
}

/// A single streaming choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: Delta,
    /// Empty until the terminal chunk, then `"stop"`.
    pub finish_reason: String,
}

/// Delta content in streaming response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub content: String,
}

/// Response from `/v1/models`: pipeline name to default model id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"assistant","content":""}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "");
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let res = serde_json::from_str::<ChatMessage>(r#"{"role":"tool","content":"x"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_missing_content_rejected() {
        let res = serde_json::from_str::<ChatMessage>(r#"{"role":"user"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"model":"m","messages":[{"role":"user","content":"hi"}],"top_p":0.9,"stop":"\n"}"#,
        )
        .unwrap();
        assert!(!req.stream);
        assert_eq!(req.max_tokens, None);
        assert_eq!(req.temperature, None);
        assert_eq!(req.top_p, Some(0.9));
    }

    #[test]
    fn test_delta_chunk_omits_usage() {
        let chunk = ChatCompletionChunk::delta("id".into(), 1, "m".into(), "hi".into());
        let json = serde_json::to_value(&chunk).unwrap();
        assert!(json.get("usage").is_none());
        assert_eq!(json["object"], "chat.completion.chunk");
        assert_eq!(json["choices"][0]["finish_reason"], "");
        assert!(!chunk.is_terminal());
    }

    #[test]
    fn test_terminal_chunk_carries_usage() {
        let chunk = ChatCompletionChunk::terminal("id".into(), 1, "m".into(), Usage::total(9));
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["usage"]["total_tokens"], 9);
        assert_eq!(json["choices"][0]["finish_reason"], "stop");
        assert!(chunk.is_terminal());
    }
}
