use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::warn;

use super::{SessionStore, StoreResult};

/// Store file name inside the data directory
const STORE_FILE: &str = "store.json";

/// Plain-file storage for platforms without a keychain.
///
/// All keys live in a single JSON object, mirroring the flat string
/// map the browser profile keeps in localStorage. Every write flushes
/// the whole map.
pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl LocalStore {
    /// Open (or create) the store under `data_dir`.
    /// A corrupt store file is logged and treated as empty.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(STORE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Store file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for LocalStore {
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
