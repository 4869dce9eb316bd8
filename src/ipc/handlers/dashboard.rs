use crate::error::{AppError, AppResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::to_json;
use crate::ipc::types::{AppState, Request};
use crate::pages::dashboard;
use chrono::{Local, Timelike};

fn handle_summary(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let hour = match req.params.get("hour").and_then(|v| v.as_u64()) {
        Some(h) if h < 24 => h as u32,
        Some(_) => return Err(AppError::bad_params("hour must be in 0..=23")),
        None => Local::now().hour(),
    };
    to_json(&dashboard::summary(state.store.as_ref(), hour)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "dashboard.summary" => handle_summary(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
