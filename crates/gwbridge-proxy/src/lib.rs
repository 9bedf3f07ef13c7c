//! OpenAI-compatible HTTP front end for the generation gateway.
//!
//! Clients talk `POST /v1/chat/completions`; every request is turned into a
//! multipart call to the gateway's `/llm-generate` endpoint and the reply is
//! translated back. Streaming replies are relayed as OpenAI SSE chunks.

#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod relay;
pub mod server;
pub mod state;
pub mod usage;

pub use gateway::HttpGateway;
pub use server::{create_router, serve};
pub use state::AppState;
