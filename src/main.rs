use fontshortcuts_lsp::server::config::ConfigManager;
use fontshortcuts_lsp::server::LspServer;
use std::sync::Arc;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let root = std::env::current_dir()?;

    let config_manager = ConfigManager::new();
    if let Err(e) = config_manager.load_from_workspace(&root).await {
        tracing::warn!("Using default configuration: {}", e);
    }
    let config = Arc::new(config_manager);

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| LspServer::new(client, config, root));
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
