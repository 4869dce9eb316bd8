use crate::backup;
use crate::error::AppResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::{str_param, to_json};
use crate::ipc::types::{AppState, Request};
use std::path::Path;

fn handle_export(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let out_path = str_param(req, "outPath")?;
    let summary = backup::export_bundle(state.store.as_ref(), Path::new(out_path))?;
    to_json(&summary)
}

fn handle_import(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let in_path = str_param(req, "inPath")?;
    let summary = backup::import_bundle(state.store.as_mut(), Path::new(in_path))?;
    state.reset_pages();
    to_json(&summary)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.export" => handle_export(state, req),
        "backup.import" => handle_import(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
