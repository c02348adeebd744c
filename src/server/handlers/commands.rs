use crate::server::error::LspError;
use crate::server::state::ServerState;
use crate::types::FontCommand;
use serde_json::json;
use std::time::Instant;
use tower_lsp::lsp_types::ExecuteCommandParams;

pub async fn handle_execute_command(
    params: ExecuteCommandParams,
    state: &ServerState,
) -> Option<serde_json::Value> {
    tracing::debug!("[HANDLE_EXECUTE_COMMAND_ENTER] cmd={}", params.command);
    let start = Instant::now();

    let result = handle_execute_command_inner(&params, state).await;

    tracing::debug!(
        "[HANDLE_EXECUTE_COMMAND_EXIT] cmd={} result={} elapsed_ms={}",
        params.command,
        if result.is_some() { "some" } else { "none" },
        start.elapsed().as_millis()
    );
    result
}

async fn handle_execute_command_inner(
    params: &ExecuteCommandParams,
    state: &ServerState,
) -> Option<serde_json::Value> {
    let command = match params.command.parse::<FontCommand>() {
        Ok(command) => command,
        Err(e) => {
            let err = LspError::from(e);
            err.log_warn();
            return Some(json!({ "error": err.to_string() }));
        }
    };

    let engine = state.engine().await;
    match engine.dispatch(command).await {
        Some(outcome) => Some(json!({
            "success": true,
            "command": command.name(),
            "outcome": outcome,
        })),
        None => Some(json!({ "success": true, "command": command.name() })),
    }
}
