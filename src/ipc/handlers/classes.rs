use crate::error::AppResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::{now_millis, opt_str, parse_params, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::pages::classes::RosterStudentForm;
use serde_json::json;

fn handle_list(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    Ok(json!({ "classes": to_json(&state.pages.classes.list())? }))
}

fn handle_create(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let name = str_param(req, "name")?;
    let subject = opt_str(req, "subject").unwrap_or("");
    let id = state
        .pages
        .classes
        .create(state.store.as_mut(), name, subject, now_millis())?;
    Ok(json!({ "classId": id }))
}

fn handle_roster(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let class_id = str_param(req, "classId")?;
    Ok(json!({ "students": to_json(&state.pages.classes.roster(class_id)?)? }))
}

fn handle_add_student(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let class_id = str_param(req, "classId")?;
    let form: RosterStudentForm = parse_params(req)?;
    let id = state
        .pages
        .classes
        .add_student(state.store.as_mut(), class_id, form, now_millis())?;
    Ok(json!({ "studentId": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut AppState, &Request) -> AppResult<serde_json::Value> =
        match req.method.as_str() {
            "classes.list" => handle_list,
            "classes.create" => handle_create,
            "classes.roster" => handle_roster,
            "classes.addStudent" => handle_add_student,
            _ => return None,
        };
    let result = match state.pages.classes.refresh(state.store.as_ref()) {
        Ok(()) => handler(state, req),
        Err(e) => Err(e),
    };
    Some(respond(&req.id, result))
}
