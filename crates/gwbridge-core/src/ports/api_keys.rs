//! API-key store port.
//!
//! The bridge consumes key storage through exactly two capabilities: check
//! a presented key and add tokens to its usage ledger. Quota policy and the
//! storage schema stay behind the implementation.

use async_trait::async_trait;
use thiserror::Error;

/// Who a validated key belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyIdentity {
    /// Stable id of the key record (never the secret itself).
    pub key_id: String,
    /// Owner of the key.
    pub user_id: String,
}

/// Errors from the key store backend.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// The backing store failed (connection, query, poisoned state).
    #[error("Key store backend error: {0}")]
    Backend(String),

    /// Usage was recorded against a key the store does not know.
    #[error("Unknown API key id: {0}")]
    UnknownKey(String),
}

/// Port for API-key validation and usage accounting.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Look up a presented key.
    ///
    /// Returns `Ok(None)` for a well-formed lookup that found no active key.
    async fn validate(&self, key: &str) -> Result<Option<ApiKeyIdentity>, KeyStoreError>;

    /// Add `tokens` to the usage of `key_id` owned by `user_id`.
    async fn record_usage(
        &self,
        key_id: &str,
        user_id: &str,
        tokens: u32,
    ) -> Result<(), KeyStoreError>;
}
