use crate::error::AppResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::{now_millis, opt_str, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::pages::notes::NOTE_COLORS;
use serde_json::json;

fn handle_list(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    Ok(json!({
        "notes": to_json(&state.pages.notes.notes())?,
        "colors": NOTE_COLORS,
    }))
}

fn handle_create(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let content = str_param(req, "content")?;
    let color = opt_str(req, "color");
    let id = state
        .pages
        .notes
        .create(state.store.as_mut(), content, color, now_millis())?;
    Ok(json!({ "noteId": id }))
}

fn handle_archive(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let note_id = str_param(req, "noteId")?;
    state.pages.notes.archive(state.store.as_mut(), note_id)?;
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut AppState, &Request) -> AppResult<serde_json::Value> =
        match req.method.as_str() {
            "notes.list" => handle_list,
            "notes.create" => handle_create,
            "notes.archive" => handle_archive,
            _ => return None,
        };
    let result = match state.pages.notes.refresh(state.store.as_ref()) {
        Ok(()) => handler(state, req),
        Err(e) => Err(e),
    };
    Some(respond(&req.id, result))
}
