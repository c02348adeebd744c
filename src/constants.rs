//! Constants used throughout the codebase.
//!
//! Setting keys and command names are a compatibility surface with clients;
//! change them only together with the client-side contributions.

/// Smallest font size that may be persisted.
pub const MIN_FONT_SIZE: f64 = 1.0;

/// Largest font size that may be persisted.
///
/// Settings values are IEEE-754 doubles, so this is the largest integer that
/// survives a round trip through them exactly (2^53 - 1).
pub const MAX_FONT_SIZE: f64 = 9_007_199_254_740_991.0;

/// Line height never goes below this after ratio preservation.
pub const MIN_LINE_HEIGHT: f64 = 0.0;

/// Step used when the step setting is absent from every layer.
pub const DEFAULT_STEP: f64 = 1.0;

/// Name of the optional server configuration file in the workspace root.
pub const CONFIG_FILE_NAME: &str = "fontshortcuts.toml";

pub const EDITOR_FONT_SIZE_KEY: &str = "editor.fontSize";
pub const TERMINAL_FONT_SIZE_KEY: &str = "terminal.integrated.fontSize";
pub const LINE_HEIGHT_KEY: &str = "editor.lineHeight";
pub const STEP_KEY: &str = "fontshortcuts.step";
pub const DEFAULT_FONT_SIZE_KEY: &str = "fontshortcuts.defaultFontSize";
pub const DEFAULT_TERMINAL_FONT_SIZE_KEY: &str = "fontshortcuts.defaultTerminalFontSize";
pub const USE_WORKSPACE_SETTINGS_KEY: &str = "fontshortcuts.useWorkspaceSettings";

/// Prefix shared by every command the server registers.
pub const COMMAND_PREFIX: &str = "fontshortcuts.";
