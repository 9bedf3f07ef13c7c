//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the translation engine expects from
//! infrastructure. They contain no implementation details: the HTTP client
//! lives in `gwbridge-proxy`, key storage is whatever the composition root
//! injects.

pub mod api_keys;
pub mod gateway;

pub use api_keys::{ApiKeyIdentity, ApiKeyStore, KeyStoreError};
pub use gateway::{GatewayBody, GatewayPort, GatewayResponse};
