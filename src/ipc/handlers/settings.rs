use crate::config::PreferenceSection;
use crate::error::{AppError, AppResult};
use crate::ipc::error::respond;
use crate::ipc::handlers::core::status_json;
use crate::ipc::helpers::{object_param, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn settings_json(state: &AppState, req: &Request) -> AppResult<serde_json::Value> {
    Ok(json!({
        "config": to_json(&state.config)?,
        "configPath": state.config_path.to_string_lossy(),
        "connection": status_json(state, req)?,
    }))
}

fn save_config(state: &AppState) -> AppResult<()> {
    state.config.save(&state.config_path)?;
    Ok(())
}

/// Opens the workspace named by `params.<key>` and remembers it in the config.
/// A workspace that cannot be opened leaves the current connection in place.
pub(crate) fn connect_workspace(
    state: &mut AppState,
    req: &Request,
    key: &str,
) -> AppResult<serde_json::Value> {
    let raw = str_param(req, key)?.trim();
    if raw.is_empty() {
        return Err(AppError::bad_params(format!("params.{} must not be empty", key)));
    }
    let path = PathBuf::from(raw);
    state.open_workspace(&path)?;
    state.config.connection.workspace_path = Some(path);
    save_config(state)?;
    tracing::info!(workspace = %raw, "workspace connected");
    status_json(state, req)
}

fn handle_get(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    settings_json(state, req)
}

fn handle_connection_save(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    connect_workspace(state, req, "workspacePath")?;
    settings_json(state, req)
}

fn handle_connection_clear(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.config.connection.workspace_path = None;
    save_config(state)?;
    state.disconnect();
    settings_json(state, req)
}

fn handle_update(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let raw = str_param(req, "section")?;
    let section = PreferenceSection::parse(raw)
        .ok_or_else(|| AppError::bad_params(format!("unknown settings section: {}", raw)))?;
    let patch = object_param(req, "patch")?;
    state
        .config
        .apply_patch(section, patch)
        .map_err(AppError::BadParams)?;
    save_config(state)?;
    settings_json(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "settings.get" => handle_get(state, req),
        "settings.connection.save" => handle_connection_save(state, req),
        "settings.connection.clear" => handle_connection_clear(state, req),
        "settings.update" => handle_update(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
