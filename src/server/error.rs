//! Structured error types for the LSP server.

use crate::types::UnknownCommand;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LspError {
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LspError {
    /// Log the error at warn level.
    pub fn log_warn(&self) {
        tracing::warn!("LSP Error: {}", self);
    }
}
