use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::COMMAND_PREFIX;

/// Which independently configured size setting an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Editor font size. Carries the dependent line height.
    Editor,
    /// Integrated terminal font size. No dependent spacing.
    Terminal,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Editor, Domain::Terminal];

    /// Whether this domain keeps a line height proportional to its size.
    pub fn has_line_height(self) -> bool {
        matches!(self, Domain::Editor)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Editor => f.write_str("editor"),
            Domain::Terminal => f.write_str("terminal"),
        }
    }
}

/// Command qualification: a single domain or both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Editor,
    Terminal,
    Both,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Editor, Target::Terminal, Target::Both];

    /// The single domain this target names, or `None` for `Both`.
    pub fn domain(self) -> Option<Domain> {
        match self {
            Target::Editor => Some(Domain::Editor),
            Target::Terminal => Some(Domain::Terminal),
            Target::Both => None,
        }
    }

    fn infix(self) -> &'static str {
        match self {
            Target::Editor => "Editor",
            Target::Terminal => "Terminal",
            Target::Both => "",
        }
    }
}

impl From<Domain> for Target {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Editor => Target::Editor,
            Domain::Terminal => Target::Terminal,
        }
    }
}

/// Requested direction of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Increase,
    Decrease,
    Reset,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Increase, Action::Decrease, Action::Reset];

    fn verb(self) -> &'static str {
        match self {
            Action::Increase => "increase",
            Action::Decrease => "decrease",
            Action::Reset => "reset",
        }
    }
}

/// Settings layer a write is persisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationTarget {
    /// User-global settings.
    Global,
    /// Workspace-local settings.
    Workspace,
}

impl ConfigurationTarget {
    pub fn from_use_workspace(use_workspace: bool) -> Self {
        if use_workspace {
            ConfigurationTarget::Workspace
        } else {
            ConfigurationTarget::Global
        }
    }
}

impl fmt::Display for ConfigurationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationTarget::Global => f.write_str("global"),
            ConfigurationTarget::Workspace => f.write_str("workspace"),
        }
    }
}

/// A parsed command trigger, e.g. `fontshortcuts.increaseEditorFontSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontCommand {
    pub action: Action,
    pub target: Target,
}

impl FontCommand {
    pub fn new(action: Action, target: Target) -> Self {
        Self { action, target }
    }

    /// Every command the server answers to, in registration order.
    pub fn all() -> Vec<FontCommand> {
        Action::ALL
            .iter()
            .flat_map(|&action| {
                Target::ALL
                    .iter()
                    .map(move |&target| FontCommand::new(action, target))
            })
            .collect()
    }

    pub fn name(&self) -> String {
        format!(
            "{}{}{}FontSize",
            COMMAND_PREFIX,
            self.action.verb(),
            self.target.infix()
        )
    }
}

impl fmt::Display for FontCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for FontCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCommand(s.to_string());

        let rest = s.strip_prefix(COMMAND_PREFIX).ok_or_else(unknown)?;
        let rest = rest.strip_suffix("FontSize").ok_or_else(unknown)?;

        let (action, infix) = Action::ALL
            .iter()
            .find_map(|&action| rest.strip_prefix(action.verb()).map(|i| (action, i)))
            .ok_or_else(unknown)?;

        let target = match infix {
            "Editor" => Target::Editor,
            "Terminal" => Target::Terminal,
            "" => Target::Both,
            _ => return Err(unknown()),
        };

        Ok(FontCommand::new(action, target))
    }
}
