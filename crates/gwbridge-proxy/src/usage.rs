//! Post-completion usage accounting.

use std::sync::Arc;

use gwbridge_core::{ApiKeyIdentity, ApiKeyStore};
use tracing::{debug, warn};

use crate::auth::Caller;

/// Records token usage for one request without holding up the response.
#[derive(Clone)]
pub struct UsageRecorder {
    store: Option<Arc<dyn ApiKeyStore>>,
    identity: Option<ApiKeyIdentity>,
}

impl UsageRecorder {
    pub fn new(store: Option<Arc<dyn ApiKeyStore>>, caller: &Caller) -> Self {
        Self {
            store,
            identity: caller.identity().cloned(),
        }
    }

    /// Whether a call to [`record`](Self::record) would reach the store.
    pub const fn is_active(&self) -> bool {
        self.store.is_some() && self.identity.is_some()
    }

    /// Add `tokens` to the caller's ledger on a detached task.
    ///
    /// Anonymous callers are not recorded. Store failures are logged and
    /// never reach the client.
    pub fn record(&self, tokens: u32) {
        let (Some(store), Some(identity)) = (self.store.clone(), self.identity.clone()) else {
            return;
        };

        tokio::spawn(async move {
            match store
                .record_usage(&identity.key_id, &identity.user_id, tokens)
                .await
            {
                Ok(()) => debug!(key_id = %identity.key_id, tokens, "Recorded usage"),
                Err(e) => warn!(key_id = %identity.key_id, tokens, "Failed to record usage: {e}"),
            }
        });
    }
}
