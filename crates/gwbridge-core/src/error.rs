//! Error taxonomy for the translation engine.
//!
//! Request-side and reply-side failures are recovered at the HTTP boundary
//! and turned into a status code. Mid-stream failures can no longer change
//! the status, so they only end the stream and get logged.

use thiserror::Error;

/// Errors produced while translating or forwarding a chat completion.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The inbound chat payload is malformed or has no messages.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The gateway could not be reached or the transport failed.
    #[error("Gateway unreachable: {0}")]
    GatewayUnreachable(String),

    /// The gateway answered with a non-success status.
    #[error("Gateway returned status {status}: {body}")]
    GatewayStatus { status: u16, body: String },

    /// The gateway reply does not match the expected schema.
    #[error("Failed to decode gateway reply: {0}")]
    Decode(String),

    /// One malformed SSE event; the stream carries on without it.
    #[error("Malformed stream event: {0}")]
    StreamFrame(String),

    /// The gateway connection failed mid-stream.
    #[error("Stream failed: {0}")]
    StreamFatal(String),

    /// The client went away. Not an application error.
    #[error("Stream cancelled by client")]
    Cancelled,

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns a suggested HTTP status code for this error.
    #[must_use]
    pub const fn suggested_status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            // nginx convention for "client closed request"
            Self::Cancelled => 499,
            Self::GatewayUnreachable(_)
            | Self::GatewayStatus { .. }
            | Self::Decode(_)
            | Self::StreamFrame(_)
            | Self::StreamFatal(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns true when the error should not be logged as a failure.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
