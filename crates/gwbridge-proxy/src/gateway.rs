//! HTTP client for the gateway's `/llm-generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use gwbridge_core::{BridgeSettings, CoreError, GatewayPort, GatewayRequest, GatewayResponse};
use reqwest::Client;
use reqwest::multipart::Form;
use tracing::debug;

/// [`GatewayPort`] over reqwest, sending each request as a multipart form.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    generate_url: String,
    request_timeout: Duration,
}

impl HttpGateway {
    /// Build a client for the gateway named in `settings`.
    ///
    /// The connect timeout applies to every call. The request timeout only
    /// bounds buffered calls; a stream stays open as long as the gateway
    /// keeps it open or the client stays connected.
    pub fn new(settings: &BridgeSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            generate_url: settings.generate_url(),
            request_timeout: settings.request_timeout,
        })
    }

    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }

    fn form(request: &GatewayRequest) -> Form {
        request
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }
}

#[async_trait]
impl GatewayPort for HttpGateway {
    async fn generate(&self, request: &GatewayRequest) -> Result<GatewayResponse, CoreError> {
        debug!(
            url = %self.generate_url,
            model = %request.model_name(),
            stream = request.stream,
            "Calling gateway"
        );

        let mut builder = self
            .client
            .post(&self.generate_url)
            .multipart(Self::form(request));
        if !request.stream {
            builder = builder.timeout(self.request_timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CoreError::GatewayUnreachable(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, "Gateway responded");

        let body = response
            .bytes_stream()
            .map_err(|e| CoreError::StreamFatal(e.to_string()));

        Ok(GatewayResponse::new(status, Box::pin(body)))
    }
}
