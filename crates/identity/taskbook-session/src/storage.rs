//! Persisted key/value storage backing the session store.
//!
//! Values are plain strings under fixed keys. A batch passed to
//! [`SessionStorage::set_many`] or [`SessionStorage::remove_many`] is applied
//! as a single write so the token and the profile never diverge on disk.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

pub const TOKEN_KEY: &str = "userToken";
pub const USER_KEY: &str = "userInfo";

#[async_trait]
pub trait SessionStorage: Send + Sync + 'static {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()>;

    async fn remove_many(&self, keys: &[&str]) -> StorageResult<()>;
}

/// Stores every entry in one JSON object on disk.
pub struct FileSessionStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// `session.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("session.json"))
    }

    /// `<config dir>/taskbook/session.json`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            StorageError::Unavailable("no configuration directory on this platform".to_string())
        })?;
        Ok(Self::in_dir(base.join("taskbook")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.read_all().await?;
        Ok(entries.get(key).cloned())
    }

    #[instrument(skip(self, entries), fields(path = ?self.path, count = entries.len()))]
    async fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.read_all().await?;
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        self.write_all(&current).await?;
        debug!("Session entries written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = ?self.path))]
    async fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = match self.read_all().await {
            Ok(current) => current,
            // A corrupt file is removed wholesale.
            Err(StorageError::Corrupt(_)) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        for key in keys {
            current.remove(*key);
        }
        self.write_all(&current).await?;
        debug!("Session entries removed");
        Ok(())
    }
}

/// Process-local storage, mainly for tests and ephemeral shells.
#[derive(Default)]
pub struct InMemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backing store had gone away.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }

    fn check(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("in-memory storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        self.check()?;
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        self.check()?;
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
