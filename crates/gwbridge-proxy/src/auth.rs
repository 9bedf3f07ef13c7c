//! API-key middleware for the protected routes.
//!
//! The key is read from `X-API-Key`, falling back to
//! `Authorization: Bearer <key>`. On success the caller's identity is put
//! into the request extensions as a [`Caller`] for the handlers.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gwbridge_core::ApiKeyIdentity;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Authentication is disabled.
    Anonymous,
    Key(ApiKeyIdentity),
}

impl Caller {
    pub const fn identity(&self) -> Option<&ApiKeyIdentity> {
        match self {
            Self::Anonymous => None,
            Self::Key(identity) => Some(identity),
        }
    }
}

/// Pull the presented key out of the headers, if any.
pub fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let from_header = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    from_header.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|k| !k.is_empty())
    })
}

/// Reject requests without a valid key.
///
/// - no key: 401 "API key is required"
/// - unknown key: 401 "Invalid API key"
/// - store failure: 500 "Error checking API key"
pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(store) = state.key_store.clone() else {
        req.extensions_mut().insert(Caller::Anonymous);
        return next.run(req).await;
    };

    let Some(key) = presented_key(req.headers()).map(str::to_owned) else {
        warn!(path = %req.uri().path(), "Rejected request without API key");
        return ApiError::unauthorized("API key is required").into_response();
    };

    match store.validate(&key).await {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(Caller::Key(identity));
            next.run(req).await
        }
        Ok(None) => {
            warn!(path = %req.uri().path(), "Rejected request with invalid API key");
            ApiError::unauthorized("Invalid API key").into_response()
        }
        Err(e) => {
            error!("Failed to validate API key: {e}");
            ApiError::internal("Error checking API key").into_response()
        }
    }
}
