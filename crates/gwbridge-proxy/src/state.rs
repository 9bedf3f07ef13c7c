//! Shared application state for the bridge server.

use std::collections::BTreeMap;
use std::sync::Arc;

use gwbridge_core::{ApiKeyStore, GatewayPort, IdGenerator, UuidIdGenerator, default_models};

/// Everything a handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Outbound generation gateway.
    pub gateway: Arc<dyn GatewayPort>,
    /// Key store; `None` disables authentication.
    pub key_store: Option<Arc<dyn ApiKeyStore>>,
    /// Pipeline -> model map served by `/v1/models`.
    pub models: Arc<BTreeMap<String, String>>,
    pub ids: Arc<dyn IdGenerator>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn GatewayPort>) -> Self {
        Self {
            gateway,
            key_store: None,
            models: Arc::new(default_models()),
            ids: Arc::new(UuidIdGenerator),
        }
    }

    #[must_use]
    pub fn with_key_store(mut self, store: Arc<dyn ApiKeyStore>) -> Self {
        self.key_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_models(mut self, models: BTreeMap<String, String>) -> Self {
        self.models = Arc::new(models);
        self
    }

    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}
