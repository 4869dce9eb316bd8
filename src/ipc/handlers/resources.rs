use crate::error::AppResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::{opt_str, parse_params, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::pages::resources::ResourceForm;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let search = opt_str(req, "search").unwrap_or("");
    Ok(json!({
        "resources": to_json(&state.pages.resources.list(search))?,
        "pendingDelete": state.pages.resources.pending_delete(),
    }))
}

fn handle_save(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let form: ResourceForm = parse_params(req)?;
    let id = state.pages.resources.save(state.store.as_mut(), form)?;
    Ok(json!({ "resourceId": id }))
}

fn handle_toggle_favorite(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let resource_id = str_param(req, "resourceId")?;
    let is_favorite = state
        .pages
        .resources
        .toggle_favorite(state.store.as_mut(), resource_id)?;
    Ok(json!({ "isFavorite": is_favorite }))
}

fn handle_request_delete(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let resource_id = str_param(req, "resourceId")?;
    state.pages.resources.request_delete(resource_id);
    Ok(json!({ "pendingDelete": resource_id }))
}

fn handle_cancel_delete(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    state.pages.resources.cancel_delete();
    Ok(json!({ "pendingDelete": null }))
}

fn handle_confirm_delete(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    let deleted = state
        .pages
        .resources
        .confirm_delete(state.store.as_mut())?;
    Ok(json!({ "deleted": deleted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut AppState, &Request) -> AppResult<serde_json::Value> =
        match req.method.as_str() {
            "resources.list" => handle_list,
            "resources.save" => handle_save,
            "resources.toggleFavorite" => handle_toggle_favorite,
            "resources.requestDelete" => handle_request_delete,
            "resources.cancelDelete" => handle_cancel_delete,
            "resources.confirmDelete" => handle_confirm_delete,
            _ => return None,
        };
    let result = match state.pages.resources.refresh(state.store.as_ref()) {
        Ok(()) => handler(state, req),
        Err(e) => Err(e),
    };
    Some(respond(&req.id, result))
}
