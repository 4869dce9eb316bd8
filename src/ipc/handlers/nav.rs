use crate::error::AppResult;
use crate::i18n::dictionary;
use crate::ipc::error::respond;
use crate::ipc::helpers::{language, to_json};
use crate::ipc::types::{AppState, Request};
use crate::nav::routes;
use serde_json::json;

fn handle_routes(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let lang = language(state, req)?;
    Ok(json!({ "routes": to_json(&routes(lang))? }))
}

fn handle_dictionary(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    to_json(dictionary(language(state, req)?))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "nav.routes" => handle_routes(state, req),
        "i18n.dictionary" => handle_dictionary(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
