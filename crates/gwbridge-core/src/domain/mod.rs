//! Domain types for both sides of the bridge.
//!
//! `openai` holds the client-facing chat-completion schema, `gateway` holds
//! the generation backend's request and reply shapes. Translation between
//! them lives in [`crate::translate`].

pub mod gateway;
pub mod openai;

pub use gateway::{GatewayRequest, GatewayStreamChunk, GatewaySyncResult};
pub use openai::{
    ChatCompletionChunk, ChatCompletionResponse, ChatMessage, ChatRequest, Choice, ChunkChoice,
    Delta, FINISH_REASON_STOP, ModelsResponse, Role, Usage,
};
