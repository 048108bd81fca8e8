//! Key-value persistence for session data.
//!
//! This module provides the `SessionStore` trait with two production
//! backends, selected once at startup:
//!
//! - **Native**: OS keychain via `keyring` (macOS Keychain, Secret
//!   Service on Linux, Credential Vault on Windows)
//! - **Browser**: a JSON file map standing in for localStorage on
//!   builds without keychain access
//!
//! `MemoryStore` backs tests. All backends share one contract: reading
//! an absent key yields `Ok(None)` and deleting an absent key succeeds.

mod local;
mod memory;
mod native;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use native::KeyringStore;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Service name registered with the OS keychain
pub const SERVICE_NAME: &str = "waypool";

/// Storage keys used by the session layer
pub struct StoreKeys;

impl StoreKeys {
    /// Bearer token for authenticated requests
    pub const AUTH_TOKEN: &'static str = "authToken";

    /// Serialized `User` profile (JSON)
    pub const USER_DATA: &'static str = "userData";
}

/// Error type for storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend-specific failure (keychain denial, missing service, ...)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Async key-value contract shared by all storage backends.
///
/// Values are opaque strings; callers own serialization. Absent keys
/// are not errors.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a value under a key, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Retrieve a value, `None` when the key has never been written
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Delete a value. Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Runtime platform the client was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Desktop or mobile build with OS keychain access
    Native,
    /// Browser build without keychain access
    Browser,
}

impl Platform {
    /// Detect the platform of the current build
    pub fn detect() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Browser
        } else {
            Platform::Native
        }
    }
}

/// Create the storage backend for a platform.
///
/// Called once at startup; every component holding the returned handle
/// talks to the same backend for the life of the process.
pub fn open_store(platform: Platform, data_dir: &Path) -> StoreResult<Arc<dyn SessionStore>> {
    match platform {
        Platform::Native => Ok(Arc::new(KeyringStore::new(SERVICE_NAME))),
        Platform::Browser => Ok(Arc::new(LocalStore::open(data_dir)?)),
    }
}
