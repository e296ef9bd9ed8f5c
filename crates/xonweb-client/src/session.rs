//! Local key-value store holding the session token
//!
//! Values are kept in memory and written through to a small JSON file so the
//! login survives restarts. A store opened without a path never touches disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::error::ClientResult;

/// Key under which the bearer token is stored
pub const SESSION_TOKEN_KEY: &str = "session_token";

#[derive(Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl SessionStore {
    /// Store that only lives in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store backed by `path`; a missing file is an empty store
    pub async fn open(path: &Path) -> ClientResult<Self> {
        let values = match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!(target: "xonweb::session", "discarding unreadable session file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!(target: "xonweb::session", "opened session store {}", path.display());

        Ok(Self {
            path: Some(path.to_path_buf()),
            values: RwLock::new(values),
        })
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values).await
    }

    pub async fn remove(&self, key: &str) -> ClientResult<()> {
        let mut values = self.values.write().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.get(SESSION_TOKEN_KEY).await
    }

    pub async fn set_token(&self, token: &str) -> ClientResult<()> {
        self.set(SESSION_TOKEN_KEY, token).await
    }

    pub async fn clear_token(&self) -> ClientResult<()> {
        self.remove(SESSION_TOKEN_KEY).await
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| crate::ClientError::Session {
            message: e.to_string(),
        })?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
