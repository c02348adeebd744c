//! Settings storage seen by the adjustment engine.
//!
//! The engine never reaches for a global settings object. It receives a
//! [`SettingsStore`], takes one [`SettingsSnapshot`] per invocation and issues
//! writes back through the same store.

pub mod error;
pub mod file;
pub mod memory;

pub use error::SettingsError;
pub use file::JsonFileSettings;
pub use memory::{InMemorySettings, SettingsUpdate};

use crate::types::ConfigurationTarget;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// Key/value settings backend with user-global and workspace-local layers.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Merged view of every layer at this moment.
    async fn snapshot(&self) -> SettingsSnapshot;

    /// Write `value` to `key` in the given layer. `None` unsets the key so the
    /// value is inherited from lower layers again.
    async fn update(
        &self,
        key: &str,
        value: Option<Value>,
        target: ConfigurationTarget,
    ) -> Result<(), SettingsError>;
}

/// Immutable merged view of settings layers.
///
/// Later layers override earlier ones; `null` never overrides and reads as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct SettingsSnapshot {
    values: FxHashMap<String, Value>,
}

impl SettingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from layers ordered lowest to highest precedence.
    pub fn from_layers<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut snapshot = Self::new();
        for layer in layers {
            snapshot.overlay(layer);
        }
        snapshot
    }

    /// Applies a higher-precedence layer on top of this snapshot.
    pub fn overlay(&mut self, layer: &Map<String, Value>) {
        for (key, value) in layer {
            if !value.is_null() {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Numeric value of `key`, if present and a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Truthiness of `key`: `true`, a non-zero number and a non-empty string
    /// count as set. Absent reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
            Some(Value::Null) | None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
