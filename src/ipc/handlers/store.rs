//! Raw collection access, for the shell's own data needs and for debugging.

use crate::error::{AppError, AppResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{object_param, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::Collection;
use serde_json::json;

fn collection_param(req: &Request) -> AppResult<Collection> {
    let raw = str_param(req, "collection")?;
    Collection::parse(raw).ok_or_else(|| AppError::bad_params(format!("unknown collection: {}", raw)))
}

fn handle_get_items(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let collection = collection_param(req)?;
    let items = state.store.get_items(collection)?;
    Ok(json!({ "items": items }))
}

fn handle_add_item(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let collection = collection_param(req)?;
    let item = object_param(req, "item")?.clone();
    let id = state.store.add_item(collection, item)?;
    Ok(json!({ "id": id }))
}

fn handle_update_item(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let collection = collection_param(req)?;
    let id = str_param(req, "id")?;
    let patch = object_param(req, "patch")?.clone();
    state.store.update_item(collection, id, patch)?;
    Ok(json!({ "ok": true }))
}

fn handle_delete_item(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let collection = collection_param(req)?;
    let id = str_param(req, "id")?;
    state.store.delete_item(collection, id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "store.getItems" => handle_get_items(state, req),
        "store.addItem" => handle_add_item(state, req),
        "store.updateItem" => handle_update_item(state, req),
        "store.deleteItem" => handle_delete_item(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
