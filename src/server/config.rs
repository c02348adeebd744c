use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_FONT_SIZE_KEY, DEFAULT_TERMINAL_FONT_SIZE_KEY, EDITOR_FONT_SIZE_KEY,
    LINE_HEIGHT_KEY, STEP_KEY, TERMINAL_FONT_SIZE_KEY, USE_WORKSPACE_SETTINGS_KEY,
};
use crate::types::Domain;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FontShortcutsConfig {
    #[serde(default)]
    pub keys: SettingKeys,
    #[serde(default)]
    pub settings: StorageConfig,
}

/// Which reset-default key each domain consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetDefaults {
    /// Editor reset reads the terminal default key and terminal reset reads
    /// the editor default key.
    #[default]
    Crossed,
    /// Each domain reads the default key carrying its own name.
    Direct,
}

/// Names of the settings the engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SettingKeys {
    #[serde(default = "default_editor_font_size")]
    pub editor_font_size: String,
    #[serde(default = "default_terminal_font_size")]
    pub terminal_font_size: String,
    #[serde(default = "default_line_height")]
    pub line_height: String,
    #[serde(default = "default_step")]
    pub step: String,
    #[serde(default = "default_default_font_size")]
    pub default_font_size: String,
    #[serde(default = "default_default_terminal_font_size")]
    pub default_terminal_font_size: String,
    #[serde(default = "default_use_workspace_settings")]
    pub use_workspace_settings: String,
    #[serde(default)]
    pub reset_defaults: ResetDefaults,
}

impl Default for SettingKeys {
    fn default() -> Self {
        Self {
            editor_font_size: default_editor_font_size(),
            terminal_font_size: default_terminal_font_size(),
            line_height: default_line_height(),
            step: default_step(),
            default_font_size: default_default_font_size(),
            default_terminal_font_size: default_default_terminal_font_size(),
            use_workspace_settings: default_use_workspace_settings(),
            reset_defaults: ResetDefaults::default(),
        }
    }
}

impl SettingKeys {
    pub fn font_size(&self, domain: Domain) -> &str {
        match domain {
            Domain::Editor => &self.editor_font_size,
            Domain::Terminal => &self.terminal_font_size,
        }
    }

    /// Key holding the size `reset` restores for `domain`.
    pub fn reset_default(&self, domain: Domain) -> &str {
        match (self.reset_defaults, domain) {
            (ResetDefaults::Crossed, Domain::Editor) | (ResetDefaults::Direct, Domain::Terminal) => {
                &self.default_terminal_font_size
            }
            (ResetDefaults::Crossed, Domain::Terminal) | (ResetDefaults::Direct, Domain::Editor) => {
                &self.default_font_size
            }
        }
    }
}

/// Where the file-backed store keeps each settings layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// User-global settings file. Defaults to the platform config directory.
    #[serde(default)]
    pub user_path: Option<PathBuf>,
    /// Workspace settings file, relative to the workspace root unless absolute.
    #[serde(default = "default_workspace_path")]
    pub workspace_path: PathBuf,
    /// Lowest-precedence values, standing in for the host's built-in defaults.
    #[serde(default = "default_host_settings")]
    pub defaults: Map<String, Value>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            user_path: None,
            workspace_path: default_workspace_path(),
            defaults: default_host_settings(),
        }
    }
}

impl StorageConfig {
    pub fn user_settings_path(&self, root: &Path) -> Option<PathBuf> {
        match &self.user_path {
            Some(path) => Some(resolve(root, path)),
            None => dirs::config_dir().map(|dir| dir.join("fontshortcuts").join("settings.json")),
        }
    }

    pub fn workspace_settings_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.workspace_path)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<FontShortcutsConfig>>,

    init_settings: Arc<RwLock<Option<serde_json::Value>>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_config(FontShortcutsConfig::default())
    }

    pub fn with_config(config: FontShortcutsConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            init_settings: Arc::new(RwLock::new(None)),
        }
    }

    pub fn get_config(&self) -> Arc<RwLock<FontShortcutsConfig>> {
        self.config.clone()
    }

    pub async fn keys(&self) -> SettingKeys {
        self.config.read().await.keys.clone()
    }

    pub async fn set_init_settings(&self, settings: Option<serde_json::Value>) {
        let mut lock = self.init_settings.write().await;
        *lock = settings;
    }

    /// Rebuilds the configuration from defaults, initialization options and
    /// `fontshortcuts.toml` in `root`, in increasing precedence.
    pub async fn load_from_workspace(&self, root: &Path) -> Result<FontShortcutsConfig, String> {
        let mut config_json = serde_json::to_value(FontShortcutsConfig::default())
            .map_err(|e| format!("Failed to serialize defaults: {}", e))?;

        {
            let init_settings = self.init_settings.read().await;
            if let Some(settings) = init_settings.as_ref() {
                merge_json(&mut config_json, settings);
            }
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let toml_content = fs::read_to_string(&config_path)
                .map_err(|e| format!("Failed to read config: {}", e))?;

            let toml_value: toml::Value = toml::from_str(&toml_content)
                .map_err(|e| format!("Failed to parse config: {}", e))?;
            let toml_json = toml_to_json(&toml_value);

            merge_json(&mut config_json, &toml_json);
        }

        let config: FontShortcutsConfig = serde_json::from_value(config_json)
            .map_err(|e| format!("Failed to deserialize merged config: {}", e))?;

        let mut lock = self.config.write().await;
        *lock = config.clone();

        Ok(config)
    }

    pub async fn update(&self, new_config: FontShortcutsConfig) {
        let mut lock = self.config.write().await;
        *lock = new_config;
    }
}

fn toml_to_json(toml: &toml::Value) -> serde_json::Value {
    match toml {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Array(arr) => serde_json::Value::Array(arr.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if overlay_val.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => {
                        base_map.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            if !overlay.is_null() {
                *base = overlay.clone();
            }
        }
    }
}

fn default_editor_font_size() -> String {
    EDITOR_FONT_SIZE_KEY.to_string()
}

fn default_terminal_font_size() -> String {
    TERMINAL_FONT_SIZE_KEY.to_string()
}

fn default_line_height() -> String {
    LINE_HEIGHT_KEY.to_string()
}

fn default_step() -> String {
    STEP_KEY.to_string()
}

fn default_default_font_size() -> String {
    DEFAULT_FONT_SIZE_KEY.to_string()
}

fn default_default_terminal_font_size() -> String {
    DEFAULT_TERMINAL_FONT_SIZE_KEY.to_string()
}

fn default_use_workspace_settings() -> String {
    USE_WORKSPACE_SETTINGS_KEY.to_string()
}

fn default_workspace_path() -> PathBuf {
    PathBuf::from(".fontshortcuts").join("settings.json")
}

fn default_host_settings() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert(EDITOR_FONT_SIZE_KEY.to_string(), json!(14));
    defaults.insert(LINE_HEIGHT_KEY.to_string(), json!(0));
    defaults.insert(TERMINAL_FONT_SIZE_KEY.to_string(), json!(14));
    defaults.insert(STEP_KEY.to_string(), json!(1));
    defaults.insert(USE_WORKSPACE_SETTINGS_KEY.to_string(), json!(false));
    defaults
}
