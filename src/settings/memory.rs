//! In-memory layered settings store.
//!
//! Backs tests and embedders that keep settings in process. Every accepted
//! write is recorded so callers can inspect exactly what was persisted.

use super::{SettingsError, SettingsSnapshot, SettingsStore};
use crate::types::ConfigurationTarget;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};

/// A single write received by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    pub key: String,
    /// `None` means the key was unset.
    pub value: Option<Value>,
    pub target: ConfigurationTarget,
}

#[derive(Debug, Default)]
struct Layers {
    defaults: Map<String, Value>,
    global: Map<String, Value>,
    workspace: Map<String, Value>,
}

impl Layers {
    fn layer(&self, target: ConfigurationTarget) -> &Map<String, Value> {
        match target {
            ConfigurationTarget::Global => &self.global,
            ConfigurationTarget::Workspace => &self.workspace,
        }
    }

    fn layer_mut(&mut self, target: ConfigurationTarget) -> &mut Map<String, Value> {
        match target {
            ConfigurationTarget::Global => &mut self.global,
            ConfigurationTarget::Workspace => &mut self.workspace,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettings {
    layers: RwLock<Layers>,
    history: Mutex<Vec<SettingsUpdate>>,
    read_only: AtomicBool,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose lowest layer holds `defaults`.
    pub fn with_defaults(defaults: Map<String, Value>) -> Self {
        let store = Self::new();
        store.layers.write().defaults = defaults;
        store
    }

    /// Sets a value directly in a layer without recording it as an update.
    pub fn set(&self, key: &str, value: Value, target: ConfigurationTarget) {
        self.layers
            .write()
            .layer_mut(target)
            .insert(key.to_string(), value);
    }

    pub fn set_default(&self, key: &str, value: Value) {
        self.layers.write().defaults.insert(key.to_string(), value);
    }

    /// Raw value of `key` in a single layer.
    pub fn get_in(&self, key: &str, target: ConfigurationTarget) -> Option<Value> {
        self.layers.read().layer(target).get(key).cloned()
    }

    /// When read-only, every update fails with [`SettingsError::Rejected`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Updates accepted so far, oldest first.
    pub fn updates(&self) -> Vec<SettingsUpdate> {
        self.history.lock().clone()
    }

    pub fn clear_updates(&self) {
        self.history.lock().clear();
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn snapshot(&self) -> SettingsSnapshot {
        let layers = self.layers.read();
        SettingsSnapshot::from_layers([&layers.defaults, &layers.global, &layers.workspace])
    }

    async fn update(
        &self,
        key: &str,
        value: Option<Value>,
        target: ConfigurationTarget,
    ) -> Result<(), SettingsError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(SettingsError::Rejected {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }

        {
            let mut layers = self.layers.write();
            let layer = layers.layer_mut(target);
            match &value {
                Some(v) => {
                    layer.insert(key.to_string(), v.clone());
                }
                None => {
                    layer.remove(key);
                }
            }
        }

        self.history.lock().push(SettingsUpdate {
            key: key.to_string(),
            value,
            target,
        });
        Ok(())
    }
}
