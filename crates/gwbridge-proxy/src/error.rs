//! OpenAI-shaped error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gwbridge_core::CoreError;
use serde::Serialize;

/// Error response in OpenAI format.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: None,
            },
        }
    }

    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type.into(),
                code: Some(code.into()),
            },
        }
    }
}

/// A status code plus an OpenAI error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(message, "invalid_request_error"),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorResponse::with_code(message, "invalid_request_error", "invalid_api_key"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(message, "server_error"),
        )
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(
            StatusCode::NOT_IMPLEMENTED,
            ErrorResponse::with_code(
                format!("Not implemented: {what}"),
                "invalid_request_error",
                "not_implemented",
            ),
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = StatusCode::from_u16(err.suggested_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let (error_type, code) = match &err {
            CoreError::InvalidRequest(_) => ("invalid_request_error", None),
            CoreError::GatewayUnreachable(_) => ("upstream_error", Some("gateway_unreachable")),
            CoreError::GatewayStatus { .. } => ("upstream_error", Some("gateway_error")),
            CoreError::Decode(_) => ("upstream_error", Some("invalid_gateway_response")),
            CoreError::StreamFrame(_) | CoreError::StreamFatal(_) => ("upstream_error", None),
            CoreError::Cancelled | CoreError::Internal(_) => ("server_error", None),
        };

        let body = match code {
            Some(code) => ErrorResponse::with_code(err.to_string(), error_type, code),
            None => ErrorResponse::new(err.to_string(), error_type),
        };
        Self::new(status, body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from(CoreError::InvalidRequest("no messages".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error.r#type, "invalid_request_error");

        let err = ApiError::from(CoreError::GatewayStatus {
            status: 502,
            body: "bad".into(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error.code.as_deref(), Some("gateway_error"));

        let err = ApiError::from(CoreError::Decode("eof".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorResponse::new("boom", "server_error")).unwrap();
        assert_eq!(body["error"]["message"], "boom");
        assert_eq!(body["error"]["type"], "server_error");
        assert!(body["error"].get("code").is_none());
    }
}
