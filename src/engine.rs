//! Font size adjustment engine.
//!
//! Computes new editor/terminal font sizes for increase, decrease and reset,
//! keeps the editor line height proportional to the editor font size, and
//! persists the results through an injected [`SettingsStore`].
//!
//! Every invocation takes a fresh snapshot; nothing is cached between calls.

use crate::constants::{DEFAULT_STEP, MAX_FONT_SIZE, MIN_FONT_SIZE, MIN_LINE_HEIGHT};
use crate::error_ext::ResultExt;
use crate::server::config::SettingKeys;
use crate::settings::{SettingsError, SettingsSnapshot, SettingsStore};
use crate::types::{Action, ConfigurationTarget, Domain, FontCommand, Target};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Surface for messages the user has to act on. Fire-and-forget.
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, message: String);
}

/// What a single-domain operation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdjustOutcome {
    /// The computed size equals the current one; nothing was written.
    Unchanged { size: f64 },
    /// New values were written.
    Updated {
        size: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        line_height: Option<f64>,
    },
    /// The settings were unset so they fall back to inherited values.
    Cleared,
    /// The configured reset default is invalid; the user was told, nothing was
    /// written.
    Rejected { key: String, value: Value },
    /// The current size is not a number in any layer, so there is nothing to
    /// adjust.
    Skipped { key: String },
}

pub struct FontSizeEngine {
    store: Arc<dyn SettingsStore>,
    reporter: Arc<dyn ErrorReporter>,
    keys: SettingKeys,
}

impl FontSizeEngine {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        reporter: Arc<dyn ErrorReporter>,
        keys: SettingKeys,
    ) -> Self {
        Self {
            store,
            reporter,
            keys,
        }
    }

    pub fn keys(&self) -> &SettingKeys {
        &self.keys
    }

    /// Runs `command`. Single-domain commands return their outcome; commands
    /// targeting both domains only report completion.
    pub async fn dispatch(&self, command: FontCommand) -> Option<AdjustOutcome> {
        match (command.action, command.target.domain()) {
            (Action::Increase, Some(domain)) => Some(self.increase(domain).await),
            (Action::Decrease, Some(domain)) => Some(self.decrease(domain).await),
            (Action::Reset, Some(domain)) => Some(self.reset(domain).await),
            (Action::Increase, None) => {
                self.increase_all().await;
                None
            }
            (Action::Decrease, None) => {
                self.decrease_all().await;
                None
            }
            (Action::Reset, None) => {
                self.reset_all().await;
                None
            }
        }
    }

    pub async fn increase(&self, domain: Domain) -> AdjustOutcome {
        self.step(domain, 1.0).await
    }

    pub async fn decrease(&self, domain: Domain) -> AdjustOutcome {
        self.step(domain, -1.0).await
    }

    /// Restores the configured default size for `domain`, or unsets the size
    /// when no default is configured.
    pub async fn reset(&self, domain: Domain) -> AdjustOutcome {
        let snapshot = self.store.snapshot().await;
        let target = self.configuration_target(&snapshot);
        let default_key = self.keys.reset_default(domain);

        let Some(default) = snapshot.get(default_key).cloned() else {
            // Best effort: a failed unset is logged and otherwise ignored.
            self.clear(domain, target)
                .await
                .ok_warn("unsetting font size settings");
            debug!(%domain, %target, "Reset font size to inherited default");
            return AdjustOutcome::Cleared;
        };

        let Some(size) = valid_font_size(&default) else {
            self.reporter
                .report_error(invalid_default_message(default_key, &default));
            warn!(%domain, key = %default_key, value = %default, "Invalid default font size");
            return AdjustOutcome::Rejected {
                key: default_key.to_string(),
                value: default,
            };
        };

        let line_height = snapshot
            .number(self.keys.font_size(domain))
            .and_then(|current| self.scaled_line_height(domain, &snapshot, current, size));

        self.write(domain, size, line_height, target).await;
        AdjustOutcome::Updated { size, line_height }
    }

    pub async fn increase_all(&self) {
        let (editor, terminal) = futures::join!(
            self.increase(Domain::Editor),
            self.increase(Domain::Terminal)
        );
        debug!(?editor, ?terminal, "Increased all font sizes");
    }

    pub async fn decrease_all(&self) {
        let (editor, terminal) = futures::join!(
            self.decrease(Domain::Editor),
            self.decrease(Domain::Terminal)
        );
        debug!(?editor, ?terminal, "Decreased all font sizes");
    }

    pub async fn reset_all(&self) {
        let (editor, terminal) =
            futures::join!(self.reset(Domain::Editor), self.reset(Domain::Terminal));
        debug!(?editor, ?terminal, "Reset all font sizes");
    }

    async fn step(&self, domain: Domain, direction: f64) -> AdjustOutcome {
        let snapshot = self.store.snapshot().await;
        let size_key = self.keys.font_size(domain);

        let Some(size) = snapshot.number(size_key) else {
            warn!(%domain, key = %size_key, "Font size setting is not a number, skipping");
            return AdjustOutcome::Skipped {
                key: size_key.to_string(),
            };
        };
        let step = snapshot.number(&self.keys.step).unwrap_or(DEFAULT_STEP);

        let new_size = clamp_font_size(round_half_up(size + direction * step));
        if new_size == size {
            debug!(%domain, size, "Font size already at bound");
            return AdjustOutcome::Unchanged { size };
        }

        let target = self.configuration_target(&snapshot);
        let line_height = self.scaled_line_height(domain, &snapshot, size, new_size);

        self.write(domain, new_size, line_height, target).await;
        AdjustOutcome::Updated {
            size: new_size,
            line_height,
        }
    }

    fn configuration_target(&self, snapshot: &SettingsSnapshot) -> ConfigurationTarget {
        ConfigurationTarget::from_use_workspace(snapshot.flag(&self.keys.use_workspace_settings))
    }

    /// Line height for `new_size` keeping the ratio observed at `old_size`.
    /// `None` for domains without a line height, or when the ratio is
    /// undefined.
    fn scaled_line_height(
        &self,
        domain: Domain,
        snapshot: &SettingsSnapshot,
        old_size: f64,
        new_size: f64,
    ) -> Option<f64> {
        if !domain.has_line_height() {
            return None;
        }
        let Some(line_height) = snapshot.number(&self.keys.line_height) else {
            debug!(key = %self.keys.line_height, "No line height to scale");
            return None;
        };
        if old_size == 0.0 || !old_size.is_finite() {
            debug!(old_size, "Line height ratio undefined");
            return None;
        }
        let ratio = line_height / old_size;
        Some(clamp_line_height(round_half_up(new_size * ratio)))
    }

    async fn write(
        &self,
        domain: Domain,
        size: f64,
        line_height: Option<f64>,
        target: ConfigurationTarget,
    ) {
        if let Some(line_height) = line_height {
            self.store
                .update(&self.keys.line_height, Some(number_value(line_height)), target)
                .await
                .ok_logged("writing line height");
        }
        self.store
            .update(self.keys.font_size(domain), Some(number_value(size)), target)
            .await
            .ok_logged("writing font size");
        info!(%domain, size, ?line_height, %target, "Font size updated");
    }

    async fn clear(&self, domain: Domain, target: ConfigurationTarget) -> Result<(), SettingsError> {
        if domain.has_line_height() {
            self.store.update(&self.keys.line_height, None, target).await?;
        }
        self.store
            .update(self.keys.font_size(domain), None, target)
            .await
    }
}

/// Rounds to the nearest integer, half-way cases toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

pub fn clamp_font_size(size: f64) -> f64 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

pub fn clamp_line_height(line_height: f64) -> f64 {
    line_height.clamp(MIN_LINE_HEIGHT, MAX_FONT_SIZE)
}

/// `value` as a persisted font size: an integer within the size bounds.
pub fn valid_font_size(value: &Value) -> Option<f64> {
    let size = value.as_f64()?;
    if size.fract() != 0.0 || !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
        return None;
    }
    Some(size)
}

pub fn invalid_default_message(key: &str, value: &Value) -> String {
    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!(
        "Cannot set font size to \"{}\". Please set \"{}\" to an integer between {} and {} in your user settings.",
        shown, key, MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64
    )
}

/// Integral values are stored as JSON integers so settings files read `16`
/// rather than `16.0`.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_FONT_SIZE {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
