//! Server state shared by every request handler.

use crate::engine::{ErrorReporter, FontSizeEngine};
use crate::server::config::ConfigManager;
use crate::settings::SettingsStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerState {
    /// Configuration manager.
    pub config: Arc<ConfigManager>,
    /// Settings the commands read and write.
    pub store: Arc<dyn SettingsStore>,
    /// Where invalid-setting errors are shown to the user.
    pub reporter: Arc<dyn ErrorReporter>,
    pub workspace_root: PathBuf,
}

impl ServerState {
    pub fn new(
        config: Arc<ConfigManager>,
        store: Arc<dyn SettingsStore>,
        reporter: Arc<dyn ErrorReporter>,
        workspace_root: PathBuf,
    ) -> Self {
        Self {
            config,
            store,
            reporter,
            workspace_root,
        }
    }

    /// Engine bound to the key names of the current configuration.
    pub async fn engine(&self) -> FontSizeEngine {
        FontSizeEngine::new(
            Arc::clone(&self.store),
            Arc::clone(&self.reporter),
            self.config.keys().await,
        )
    }
}
