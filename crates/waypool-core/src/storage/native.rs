use async_trait::async_trait;
use keyring::Entry;
use tokio::task;

use super::{SessionStore, StoreError, StoreResult};

/// Secure storage backed by the OS keychain.
///
/// The `keyring` API blocks on platform IPC (Secret Service, Keychain
/// Services), so every call runs on the blocking thread pool.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(service: &str, key: &str) -> StoreResult<Entry> {
        Entry::new(service, key).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for KeyringStore {
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let service = self.service.clone();
        let key = key.to_string();
        let value = value.to_string();
        run_blocking(move || {
            Self::entry(&service, &key)?
                .set_password(&value)
                .map_err(|e| StoreError::Backend(e.to_string()))
        })
        .await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let service = self.service.clone();
        let key = key.to_string();
        run_blocking(move || match Self::entry(&service, &key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let service = self.service.clone();
        let key = key.to_string();
        run_blocking(move || match Self::entry(&service, &key)?.delete_credential() {
            Ok(()) => Ok(()),
            // Absent keys delete cleanly by contract
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Backend(format!("Storage task failed: {}", e)))?
}
