//! # Wildywatch Store
//!
//! Durable mapping from guild id to notification destination. The whole map
//! is held in memory behind one async mutex and rewritten to a pretty JSON
//! file on every mutation, so the file stays human-inspectable and a restart
//! recovers exactly the last persisted state.
//!
//! Saves go through a temp file + rename, so a reader never observes a
//! half-written map. Mutation and persist happen under one lock hold; the
//! lock is never held across a network round-trip.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use wildywatch_core::error::{Result, WildywatchError};
use wildywatch_core::types::Subscription;

/// Owned subscription store. All access goes through its methods — the raw
/// map is never exposed to callers.
#[derive(Debug)]
pub struct SubscriptionStore {
    path: PathBuf,
    inner: Mutex<HashMap<String, Subscription>>,
}

impl SubscriptionStore {
    /// Load the store from `path`. A missing file is a first run, not an
    /// error; a present-but-unreadable file is surfaced loudly, since
    /// silently starting empty would overwrite state on the next mutation.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                WildywatchError::persistence(format!("corrupt {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(WildywatchError::persistence(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };

        tracing::info!("Loaded {} subscription(s) from {}", map.len(), path.display());
        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    /// Upsert the subscription for a guild and persist. Enabling twice from
    /// different channels keeps only the latest destination.
    pub async fn set_enabled(
        &self,
        guild_id: &str,
        channel_id: &str,
        enabled: bool,
    ) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.insert(
            guild_id.to_string(),
            Subscription {
                channel_id: channel_id.to_string(),
                enabled,
            },
        );
        self.persist(&map).await
    }

    /// Flip a guild's subscription to disabled, keeping the entry. Returns
    /// whether an entry existed. Disabling is the only removal-like action.
    pub async fn disable(&self, guild_id: &str) -> Result<bool> {
        let mut map = self.inner.lock().await;
        let Some(sub) = map.get_mut(guild_id) else {
            return Ok(false);
        };
        sub.enabled = false;
        self.persist(&map).await?;
        Ok(true)
    }

    /// Snapshot of all currently enabled subscriptions.
    pub async fn enabled_entries(&self) -> Vec<(String, Subscription)> {
        let map = self.inner.lock().await;
        map.iter()
            .filter(|(_, sub)| sub.enabled)
            .map(|(id, sub)| (id.clone(), sub.clone()))
            .collect()
    }

    pub async fn get(&self, guild_id: &str) -> Option<Subscription> {
        self.inner.lock().await.get(guild_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Full rewrite of the subscriptions file. Write-then-rename keeps the
    /// on-disk map whole even if the process dies mid-save.
    async fn persist(&self, map: &HashMap<String, Subscription>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            WildywatchError::persistence(format!("write {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            WildywatchError::persistence(format!("rename into {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
