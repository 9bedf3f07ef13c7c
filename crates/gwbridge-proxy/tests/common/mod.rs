//! Shared fixtures for the bridge route tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use gwbridge_core::{CoreError, GatewayPort, GatewayRequest, GatewayResponse};
use gwbridge_proxy::AppState;

/// Gateway double that replays a canned reply and remembers the last request.
#[derive(Debug)]
pub struct ScriptedGateway {
    status: u16,
    parts: Vec<&'static str>,
    /// Keep the body open after the last part instead of ending it.
    hang: bool,
    unreachable: bool,
    last: Mutex<Option<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn replying(status: u16, parts: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            status,
            parts,
            hang: false,
            unreachable: false,
            last: Mutex::new(None),
        })
    }

    /// Send `parts`, then go quiet without closing the stream.
    pub fn replying_then_silent(parts: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            status: 200,
            parts,
            hang: true,
            unreachable: false,
            last: Mutex::new(None),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            status: 0,
            parts: Vec::new(),
            hang: false,
            unreachable: true,
            last: Mutex::new(None),
        })
    }

    pub fn last_request(&self) -> Option<GatewayRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayPort for ScriptedGateway {
    async fn generate(&self, request: &GatewayRequest) -> Result<GatewayResponse, CoreError> {
        *self.last.lock().unwrap() = Some(request.clone());
        if self.unreachable {
            return Err(CoreError::GatewayUnreachable("connection refused".into()));
        }
        let parts = stream::iter(
            self.parts
                .clone()
                .into_iter()
                .map(|p| Ok::<_, CoreError>(Bytes::from_static(p.as_bytes()))),
        );
        let body = if self.hang {
            parts.chain(stream::pending()).boxed()
        } else {
            parts.boxed()
        };
        Ok(GatewayResponse::new(self.status, body))
    }
}

pub fn state_with(gateway: Arc<ScriptedGateway>) -> AppState {
    AppState::new(gateway)
}

pub fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat/completions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const SIMPLE_CHAT: &str =
    r#"{"model":"llama","messages":[{"role":"user","content":"Hello"}]}"#;

pub const STREAM_CHAT: &str =
    r#"{"model":"llama","stream":true,"messages":[{"role":"user","content":"Hello"}]}"#;
