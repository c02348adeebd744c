pub mod constants;
pub mod engine;
pub mod error_ext;
pub mod server;
pub mod settings;
pub mod types;

pub use engine::{AdjustOutcome, ErrorReporter, FontSizeEngine};
pub use server::config::{ConfigManager, FontShortcutsConfig, ResetDefaults, SettingKeys};
pub use server::LspServer;
pub use settings::{InMemorySettings, JsonFileSettings, SettingsStore};
