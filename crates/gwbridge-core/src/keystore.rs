//! In-memory API-key store.
//!
//! Backs the key-store port with a fixed set of keys supplied at start-up and
//! a per-key running token total. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::ports::{ApiKeyIdentity, ApiKeyStore, KeyStoreError};

/// Owner recorded for every key of the in-memory store.
pub const LOCAL_USER_ID: &str = "local";

#[derive(Debug)]
pub struct InMemoryKeyStore {
    /// Secret -> identity.
    keys: HashMap<String, ApiKeyIdentity>,
    /// key_id -> tokens recorded so far.
    usage: Mutex<HashMap<String, u64>>,
}

impl InMemoryKeyStore {
    /// Build a store accepting `keys`. Key ids are assigned in order
    /// (`key-1`, `key-2`, ...); blank and duplicate keys are skipped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = HashMap::new();
        for key in keys {
            let key = key.into().trim().to_string();
            if key.is_empty() || map.contains_key(&key) {
                continue;
            }
            let identity = ApiKeyIdentity {
                key_id: format!("key-{}", map.len() + 1),
                user_id: LOCAL_USER_ID.to_string(),
            };
            map.insert(key, identity);
        }

        Self {
            keys: map,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Number of accepted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Tokens recorded so far for `key_id`.
    pub fn usage_for(&self, key_id: &str) -> Result<u64, KeyStoreError> {
        let usage = self
            .usage
            .lock()
            .map_err(|_| KeyStoreError::Backend("usage ledger poisoned".to_string()))?;
        Ok(usage.get(key_id).copied().unwrap_or(0))
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryKeyStore {
    async fn validate(&self, key: &str) -> Result<Option<ApiKeyIdentity>, KeyStoreError> {
        Ok(self.keys.get(key).cloned())
    }

    async fn record_usage(
        &self,
        key_id: &str,
        user_id: &str,
        tokens: u32,
    ) -> Result<(), KeyStoreError> {
        if !self.keys.values().any(|identity| identity.key_id == key_id) {
            return Err(KeyStoreError::UnknownKey(key_id.to_string()));
        }

        let mut usage = self
            .usage
            .lock()
            .map_err(|_| KeyStoreError::Backend("usage ledger poisoned".to_string()))?;
        let total = usage.entry(key_id.to_string()).or_insert(0);
        *total += u64::from(tokens);
        debug!(key_id, user_id, tokens, total = *total, "Recorded API usage");
        Ok(())
    }
}
