use crate::error::{AppError, AppResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{
    language, now_millis, opt_str, parse_field, parse_params, str_param, to_json,
};
use crate::ipc::types::{AppState, Request};
use crate::model::InterventionType;
use crate::pages::students::{add_custom_tag, toggle_tag, GradeForm, StudentForm, StudentPatch};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let lang = language(state, req)?;
    let search = opt_str(req, "search").unwrap_or("");
    Ok(json!({ "students": to_json(&state.pages.students.list(search, lang))? }))
}

fn handle_create(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let form: StudentForm = parse_params(req)?;
    let id = state
        .pages
        .students
        .create(state.store.as_mut(), form, now_millis())?;
    Ok(json!({ "studentId": id }))
}

fn handle_update(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let student_id = str_param(req, "studentId")?;
    let changes: StudentPatch = parse_field(req, "patch")?;
    state
        .pages
        .students
        .update(state.store.as_mut(), student_id, changes)?;
    Ok(json!({ "ok": true }))
}

fn handle_detail(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let lang = language(state, req)?;
    let student_id = str_param(req, "studentId")?;
    to_json(&state.pages.students.detail(student_id, lang)?)
}

fn handle_intervention_create(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let student_id = str_param(req, "studentId")?;
    let raw_type = str_param(req, "type")?;
    let kind = InterventionType::parse(raw_type)
        .ok_or_else(|| AppError::bad_params(format!("unknown intervention type: {}", raw_type)))?;
    let description = opt_str(req, "description").unwrap_or("");
    let id = state.pages.students.add_intervention(
        state.store.as_mut(),
        student_id,
        kind,
        description,
        now_millis(),
    )?;
    Ok(json!({ "interventionId": id }))
}

fn handle_intervention_toggle(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let intervention_id = str_param(req, "interventionId")?;
    let status = state
        .pages
        .students
        .toggle_intervention(state.store.as_mut(), intervention_id)?;
    Ok(json!({ "status": status }))
}

fn handle_grade_save(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let form: GradeForm = parse_params(req)?;
    let id = state
        .pages
        .students
        .save_grade(state.store.as_mut(), form, now_millis())?;
    Ok(json!({ "gradeId": id }))
}

fn handle_follow_up_create(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let student_id = str_param(req, "studentId")?;
    let title = str_param(req, "title")?;
    let content = opt_str(req, "content").unwrap_or("");
    let id = state.pages.students.add_follow_up(
        state.store.as_mut(),
        student_id,
        title,
        content,
        now_millis(),
    )?;
    Ok(json!({ "followUpId": id }))
}

fn handle_special_needs_toggle(_state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let tags: Vec<String> = parse_field(req, "tags")?;
    let tag = str_param(req, "tag")?;
    Ok(json!({ "tags": toggle_tag(&tags, tag) }))
}

fn handle_special_needs_add(_state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let tags: Vec<String> = parse_field(req, "tags")?;
    let tag = str_param(req, "tag")?;
    Ok(json!({ "tags": add_custom_tag(&tags, tag) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut AppState, &Request) -> AppResult<serde_json::Value> =
        match req.method.as_str() {
            "students.list" => handle_list,
            "students.create" => handle_create,
            "students.update" => handle_update,
            "students.detail" => handle_detail,
            "interventions.create" => handle_intervention_create,
            "interventions.toggleStatus" => handle_intervention_toggle,
            "grades.save" => handle_grade_save,
            "followUps.create" => handle_follow_up_create,
            "students.specialNeeds.toggle" => handle_special_needs_toggle,
            "students.specialNeeds.addCustom" => handle_special_needs_add,
            _ => return None,
        };
    let result = match state.pages.students.refresh(state.store.as_ref()) {
        Ok(()) => handler(state, req),
        Err(e) => Err(e),
    };
    Some(respond(&req.id, result))
}
