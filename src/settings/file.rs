//! Layered settings backed by flat JSON files.
//!
//! Three layers, lowest precedence first: host defaults from the server
//! configuration, the user-global settings file and the workspace settings
//! file. Each file is a single JSON object keyed by dotted setting names.
//! File locations are re-read from the configuration on every call, so a
//! configuration reload takes effect on the next command.

use super::{SettingsError, SettingsSnapshot, SettingsStore};
use crate::server::config::{FontShortcutsConfig, StorageConfig};
use crate::error_ext::ResultExt;
use crate::types::ConfigurationTarget;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub struct JsonFileSettings {
    root: PathBuf,
    config: Arc<RwLock<FontShortcutsConfig>>,
    // Serializes read-modify-write cycles so concurrent updates to the same
    // file cannot drop each other's keys.
    write_lock: Mutex<()>,
}

impl JsonFileSettings {
    pub fn new(root: impl Into<PathBuf>, config: Arc<RwLock<FontShortcutsConfig>>) -> Self {
        Self {
            root: root.into(),
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn storage(&self) -> StorageConfig {
        self.config.read().await.settings.clone()
    }

    fn path_for(&self, storage: &StorageConfig, target: ConfigurationTarget) -> Option<PathBuf> {
        match target {
            ConfigurationTarget::Global => storage.user_settings_path(&self.root),
            ConfigurationTarget::Workspace => Some(storage.workspace_settings_path(&self.root)),
        }
    }
}

/// Reads one settings file. `Ok(None)` when the file does not exist.
pub async fn read_layer(path: &Path) -> Result<Option<Map<String, Value>>, SettingsError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SettingsError::io(path, e)),
    };
    parse_layer(path, &content).map(Some)
}

fn parse_layer(path: &Path, content: &str) -> Result<Map<String, Value>, SettingsError> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(SettingsError::NotAnObject {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SettingsError::parse(path, e)),
    }
}

/// Replaces `path` with the pretty-printed `layer`, going through a sibling
/// temporary file so readers never observe a half-written object.
async fn write_layer(path: &Path, layer: &Map<String, Value>) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SettingsError::io(parent, e))?;
    }

    let mut content = serde_json::to_string_pretty(layer).map_err(|e| SettingsError::parse(path, e))?;
    content.push('\n');

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| SettingsError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| SettingsError::io(path, e))
}

#[async_trait]
impl SettingsStore for JsonFileSettings {
    async fn snapshot(&self) -> SettingsSnapshot {
        let storage = self.storage().await;
        let mut snapshot = SettingsSnapshot::from_layers([&storage.defaults]);

        for target in [ConfigurationTarget::Global, ConfigurationTarget::Workspace] {
            let Some(path) = self.path_for(&storage, target) else {
                continue;
            };
            let layer = read_layer(&path)
                .await
                .ok_warn("reading settings file")
                .flatten();
            if let Some(layer) = layer {
                snapshot.overlay(&layer);
            }
        }

        snapshot
    }

    async fn update(
        &self,
        key: &str,
        value: Option<Value>,
        target: ConfigurationTarget,
    ) -> Result<(), SettingsError> {
        let storage = self.storage().await;
        let path = self
            .path_for(&storage, target)
            .ok_or_else(|| SettingsError::Rejected {
                key: key.to_string(),
                reason: format!("no {} settings location is available", target),
            })?;

        let _guard = self.write_lock.lock().await;

        let existing = read_layer(&path).await?;
        let mut layer = match (existing, &value) {
            (Some(layer), _) => layer,
            // Unsetting a key in a file that does not exist leaves nothing to do.
            (None, None) => return Ok(()),
            (None, Some(_)) => Map::new(),
        };

        let changed = match value {
            Some(v) => layer.insert(key.to_string(), v.clone()) != Some(v),
            None => layer.remove(key).is_some(),
        };
        if !changed {
            debug!(key = %key, path = %path.display(), "Settings file already up to date");
            return Ok(());
        }

        write_layer(&path, &layer).await?;
        debug!(key = %key, %target, path = %path.display(), "Wrote settings file");
        Ok(())
    }
}
