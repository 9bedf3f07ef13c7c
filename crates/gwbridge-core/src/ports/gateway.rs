//! Gateway port: the single outbound call the bridge makes.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::domain::GatewayRequest;
use crate::error::CoreError;

/// Raw gateway body. Read failures surface as [`CoreError::StreamFatal`].
pub type GatewayBody = BoxStream<'static, Result<Bytes, CoreError>>;

/// Upper bound on how much of an error body is kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 4096;

/// Status plus unread body of a gateway reply.
pub struct GatewayResponse {
    pub status: u16,
    pub body: GatewayBody,
}

impl fmt::Debug for GatewayResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl GatewayResponse {
    pub fn new(status: u16, body: GatewayBody) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Hand back the body of a 2xx reply.
    ///
    /// Any other status is turned into [`CoreError::GatewayStatus`] carrying
    /// the first few KiB of the error body.
    pub async fn into_success(self) -> Result<GatewayBody, CoreError> {
        if self.is_success() {
            return Ok(self.body);
        }

        let status = self.status;
        let mut body = self.body;
        let mut text = Vec::new();
        while text.len() < ERROR_BODY_LIMIT {
            match body.next().await {
                Some(Ok(bytes)) => text.extend_from_slice(&bytes),
                Some(Err(_)) | None => break,
            }
        }
        text.truncate(ERROR_BODY_LIMIT);

        Err(CoreError::GatewayStatus {
            status,
            body: String::from_utf8_lossy(&text).trim().to_string(),
        })
    }

    /// [`into_success`](Self::into_success) followed by [`collect`](Self::collect).
    pub async fn into_success_bytes(self) -> Result<Vec<u8>, CoreError> {
        let status = self.status;
        let body = self.into_success().await?;
        Self::new(status, body).collect().await
    }

    /// Buffer the whole body.
    pub async fn collect(self) -> Result<Vec<u8>, CoreError> {
        let mut body = self.body;
        let mut out = Vec::new();
        while let Some(next) = body.next().await {
            match next {
                Ok(bytes) => out.extend_from_slice(&bytes),
                Err(CoreError::StreamFatal(reason)) => {
                    return Err(CoreError::GatewayUnreachable(reason));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }
}

/// Port for the generation gateway.
///
/// Implementations encode the request, send it to `<gateway>/llm-generate`
/// and return the raw reply without interpreting the body.
#[async_trait]
pub trait GatewayPort: Send + Sync + fmt::Debug {
    /// Issue one generation call.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::GatewayUnreachable`] when no response arrives.
    async fn generate(&self, request: &GatewayRequest) -> Result<GatewayResponse, CoreError>;
}
