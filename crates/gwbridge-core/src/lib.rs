//! Core of the OpenAI-to-gateway bridge.
//!
//! This crate owns everything that does not touch a socket: the OpenAI and
//! gateway data models, the request/response/stream translators, the error
//! taxonomy, and the ports that HTTP adapters implement.
//!
//! - [`translate::translate_request`] maps an OpenAI chat payload onto the
//!   gateway's prompt + system message + history shape.
//! - [`translate::translate_sync_body`] maps a buffered gateway reply onto a
//!   `chat.completion` envelope.
//! - [`translate::spawn_stream_translator`] turns a gateway SSE byte stream
//!   into `chat.completion.chunk` objects on a rendezvous channel.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ids;
pub mod keystore;
pub mod ports;
pub mod settings;
pub mod translate;

// Re-export commonly used types for convenience
pub use domain::{
    ChatCompletionChunk, ChatCompletionResponse, ChatMessage, ChatRequest, Choice, ChunkChoice,
    Delta, FINISH_REASON_STOP, GatewayRequest, GatewayStreamChunk, GatewaySyncResult,
    ModelsResponse, Role, Usage,
};
pub use error::CoreError;
pub use ids::{COMPLETION_ID_PREFIX, IdGenerator, UuidIdGenerator};
pub use keystore::InMemoryKeyStore;
pub use ports::{
    ApiKeyIdentity, ApiKeyStore, GatewayBody, GatewayPort, GatewayResponse, KeyStoreError,
};
pub use settings::{
    BridgeSettings, DEFAULT_GATEWAY_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
    SettingsError, default_models, validate_settings,
};

