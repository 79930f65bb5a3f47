//! Client-local durable storage for favorites and filters.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::PropertyId;
use crate::store::filters::FilterState;

/// Namespace the list state is stored under
pub const STORE_KEY: &str = "properties-store";

/// Key/value store that survives restarts
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;

    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// The slice of list state that is persisted. Favorites travel as an array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub favorites: Vec<PropertyId>,
    pub filters: FilterState,
}

impl PersistedState {
    pub fn new(favorites: &BTreeSet<PropertyId>, filters: &FilterState) -> Self {
        Self {
            favorites: favorites.iter().cloned().collect(),
            filters: filters.clone(),
        }
    }

    pub fn favorite_set(&self) -> BTreeSet<PropertyId> {
        self.favorites.iter().cloned().collect()
    }

    pub async fn read(store: &dyn StateStore) -> Result<Option<Self>> {
        match store.load(STORE_KEY).await? {
            Some(raw) => {
                let state = serde_json::from_str(&raw).context("Failed to parse persisted state")?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    pub async fn write(&self, store: &dyn StateStore) -> Result<()> {
        let raw = serde_json::to_string(self)?;
        store.save(STORE_KEY, &raw).await
    }
}

/// One JSON file per key inside a directory
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                debug!("Loaded {} bytes from {}", raw.len(), path.display());
                Ok(Some(raw))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path(key);
        tokio::fs::write(&path, value)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// In-process store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("state store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("state store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
