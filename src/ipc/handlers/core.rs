use crate::error::AppResult;
use crate::i18n::dictionary;
use crate::ipc::error::respond;
use crate::ipc::handlers::settings::connect_workspace;
use crate::ipc::helpers::language;
use crate::ipc::types::{AppState, Request};
use crate::store::ApiStatus;
use serde_json::json;

fn workspace_json(state: &AppState) -> serde_json::Value {
    json!(state
        .workspace
        .as_ref()
        .map(|p| p.to_string_lossy().to_string()))
}

fn handle_health(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workspacePath": workspace_json(state),
        "storeStatus": state.store.status().as_str(),
    }))
}

pub(crate) fn status_json(state: &AppState, req: &Request) -> AppResult<serde_json::Value> {
    let status = state.store.status();
    let dict = dictionary(language(state, req)?);
    let label = match status {
        ApiStatus::Connected => dict.api_connected,
        ApiStatus::Mock => dict.api_mock,
    };
    Ok(json!({
        "status": status.as_str(),
        "label": label,
        "workspacePath": workspace_json(state),
    }))
}

fn handle_store_status(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    status_json(state, req)
}

/// Same as saving the connection from the settings page.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    connect_workspace(state, req, "path")
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state, req),
        "store.status" => handle_store_status(state, req),
        "workspace.select" => handle_workspace_select(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
