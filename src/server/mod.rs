pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::LspError;

use crate::constants::CONFIG_FILE_NAME;
use crate::engine::ErrorReporter;
use crate::server::config::ConfigManager;
use crate::server::state::ServerState;
use crate::settings::{JsonFileSettings, SettingsStore};
use crate::types::FontCommand;
use std::path::PathBuf;
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::info;

/// Shows errors to the user through `window/showMessage`.
#[derive(Clone)]
pub struct ClientReporter {
    client: Client,
}

impl ClientReporter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ErrorReporter for ClientReporter {
    fn report_error(&self, message: String) {
        let client = self.client.clone();
        tokio::spawn(async move {
            client.show_message(MessageType::ERROR, message).await;
        });
    }
}

pub struct LspServer {
    pub client: Client,
    pub state: ServerState,
}

impl LspServer {
    /// Server persisting settings to the JSON files named by `config`.
    pub fn new(client: Client, config: Arc<ConfigManager>, workspace_root: PathBuf) -> Self {
        let store = Arc::new(JsonFileSettings::new(
            workspace_root.clone(),
            config.get_config(),
        ));
        Self::new_with_store(client, config, store, workspace_root)
    }

    pub fn new_with_store(
        client: Client,
        config: Arc<ConfigManager>,
        store: Arc<dyn SettingsStore>,
        workspace_root: PathBuf,
    ) -> Self {
        let reporter = Arc::new(ClientReporter::new(client.clone()));
        let state = ServerState::new(config, store, reporter, workspace_root);
        Self { client, state }
    }

    pub async fn register_watched_files(&self) {
        let watchers = vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(format!("**/{}", CONFIG_FILE_NAME)),
            kind: None,
        }];

        let register_options =
            match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions { watchers }) {
                Ok(options) => options,
                Err(e) => {
                    LspError::Internal(e.to_string()).log_warn();
                    return;
                }
            };

        let registration = Registration {
            id: "fontshortcuts-config-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to register watcher: {}", e),
                )
                .await;
        }
    }

    async fn reload_config(&self) {
        let root = &self.state.workspace_root;
        match self.state.config.load_from_workspace(root).await {
            Ok(_) => {
                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("Loaded configuration from {}", root.display()),
                    )
                    .await;
            }
            Err(e) => {
                let err = LspError::Config(e);
                err.log_warn();
                self.client
                    .log_message(MessageType::WARNING, err.to_string())
                    .await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.state
            .config
            .set_init_settings(params.initialization_options)
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: FontCommand::all().iter().map(FontCommand::name).collect(),
                    work_done_progress_options: WorkDoneProgressOptions {
                        work_done_progress: None,
                    },
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "fontshortcuts-lsp initialized!")
            .await;

        self.reload_config().await;
        self.register_watched_files().await;
        info!(root = %self.state.workspace_root.display(), "Server ready");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let config_changed = params.changes.iter().any(|change| {
            change
                .uri
                .to_file_path()
                .map(|path| path.ends_with(CONFIG_FILE_NAME))
                .unwrap_or(false)
        });

        if config_changed {
            self.client
                .log_message(MessageType::INFO, "Reloading configuration...")
                .await;
            self.reload_config().await;
        }
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        Ok(handlers::handle_execute_command(params, &self.state).await)
    }
}
