use crate::calendar::drag::DropTarget;
use crate::calendar::grid::ViewMode;
use crate::error::{AppError, AppResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{date_param, i64_param, language, opt_str, str_param, to_json};
use crate::ipc::types::{AppState, Request};
use crate::model::EventType;
use chrono::Local;
use serde_json::json;

fn view_json(state: &AppState, req: &Request) -> AppResult<serde_json::Value> {
    let lang = language(state, req)?;
    let today = Local::now().date_naive();
    to_json(&state.pages.calendar.view_model(today, lang))
}

fn with_view(
    state: &AppState,
    req: &Request,
    mut result: serde_json::Value,
) -> AppResult<serde_json::Value> {
    result["calendar"] = view_json(state, req)?;
    Ok(result)
}

fn target_param(req: &Request) -> AppResult<DropTarget> {
    match str_param(req, "target")? {
        "trash" => Ok(DropTarget::Trash),
        "day" => Ok(DropTarget::Day(date_param(req, "date")?)),
        other => Err(AppError::bad_params(format!("unknown drop target: {}", other))),
    }
}

fn handle_open(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.go_to_today(Local::now().naive_local());
    view_json(state, req)
}

fn handle_view(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    view_json(state, req)
}

fn handle_set_view(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let raw = str_param(req, "view")?;
    let view = ViewMode::parse(raw)
        .ok_or_else(|| AppError::bad_params("view must be one of: month, week"))?;
    state.pages.calendar.set_view(view);
    view_json(state, req)
}

fn handle_navigate(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let delta = i64_param(req, "delta")?;
    let delta = i32::try_from(delta).map_err(|_| AppError::bad_params("delta out of range"))?;
    state.pages.calendar.navigate(delta)?;
    view_json(state, req)
}

fn handle_today(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.go_to_today(Local::now().naive_local());
    view_json(state, req)
}

fn handle_add_event(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let date = date_param(req, "date")?;
    let time = opt_str(req, "time").unwrap_or("");
    let title = str_param(req, "title")?;
    let kind = match opt_str(req, "type") {
        Some(raw) => EventType::parse(raw)
            .ok_or_else(|| AppError::bad_params(format!("unknown event type: {}", raw)))?,
        None => EventType::General,
    };
    let (event_id, mutation_id) =
        state
            .pages
            .calendar
            .add_event(state.store.as_mut(), date, time, title, kind)?;
    with_view(
        state,
        req,
        json!({ "eventId": event_id, "mutationId": mutation_id }),
    )
}

fn handle_drag_start(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    match str_param(req, "kind")? {
        "note" => state.pages.calendar.drag_note(str_param(req, "noteId")?)?,
        "event" => state.pages.calendar.drag_event(str_param(req, "eventId")?)?,
        other => return Err(AppError::bad_params(format!("unknown drag kind: {}", other))),
    }
    to_json(&state.pages.calendar.drag_snapshot())
}

fn handle_drag_over(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.drag_over(target_param(req)?);
    to_json(&state.pages.calendar.drag_snapshot())
}

fn handle_drag_leave(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.drag_leave(target_param(req)?);
    to_json(&state.pages.calendar.drag_snapshot())
}

fn handle_drag_end(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.drag_end();
    to_json(&state.pages.calendar.drag_snapshot())
}

fn handle_drop(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let target = target_param(req)?;
    let outcome = state
        .pages
        .calendar
        .drop_on(state.store.as_mut(), target)?;
    with_view(state, req, to_json(&outcome)?)
}

fn handle_edit_start(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let event_id = str_param(req, "eventId")?;
    to_json(state.pages.calendar.start_edit(event_id)?)
}

fn handle_edit_update(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let date = opt_str(req, "date").map(str::to_string);
    let time = opt_str(req, "time").map(str::to_string);
    state.pages.calendar.update_edit(date, time)?;
    to_json(&state.pages.calendar.editing())
}

fn handle_edit_save(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let mutation_id = state.pages.calendar.save_edit(state.store.as_mut())?;
    with_view(state, req, json!({ "mutationId": mutation_id }))
}

fn handle_edit_cancel(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.cancel_edit();
    view_json(state, req)
}

fn handle_request_delete(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let event_id = str_param(req, "eventId")?;
    state.pages.calendar.request_delete(event_id);
    Ok(json!({ "pendingDelete": event_id }))
}

fn handle_cancel_delete(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    state.pages.calendar.cancel_delete();
    Ok(json!({ "pendingDelete": null }))
}

fn handle_confirm_delete(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let mutation_id = state
        .pages
        .calendar
        .confirm_delete(state.store.as_mut())?;
    with_view(state, req, json!({ "mutationId": mutation_id }))
}

fn handle_mutations(state: &mut AppState, _req: &Request) -> AppResult<serde_json::Value> {
    let records: Vec<_> = state.pages.calendar.mutations().collect();
    let failed = records.iter().filter(|r| r.is_failed()).count();
    Ok(json!({ "mutations": to_json(&records)?, "failed": failed }))
}

fn handle_retry(state: &mut AppState, req: &Request) -> AppResult<serde_json::Value> {
    let id = i64_param(req, "mutationId")?;
    let id = u64::try_from(id).map_err(|_| AppError::bad_params("mutationId out of range"))?;
    let mutation_id = state.pages.calendar.retry(state.store.as_mut(), id)?;
    with_view(state, req, json!({ "mutationId": mutation_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut AppState, &Request) -> AppResult<serde_json::Value> =
        match req.method.as_str() {
            "calendar.open" => handle_open,
            "calendar.view" => handle_view,
            "calendar.setView" => handle_set_view,
            "calendar.navigate" => handle_navigate,
            "calendar.today" => handle_today,
            "calendar.addEvent" => handle_add_event,
            "calendar.drag.start" => handle_drag_start,
            "calendar.drag.over" => handle_drag_over,
            "calendar.drag.leave" => handle_drag_leave,
            "calendar.drag.end" => handle_drag_end,
            "calendar.drop" => handle_drop,
            "calendar.edit.start" => handle_edit_start,
            "calendar.edit.update" => handle_edit_update,
            "calendar.edit.save" => handle_edit_save,
            "calendar.edit.cancel" => handle_edit_cancel,
            "calendar.requestDelete" => handle_request_delete,
            "calendar.cancelDelete" => handle_cancel_delete,
            "calendar.confirmDelete" => handle_confirm_delete,
            "calendar.mutations" => handle_mutations,
            "calendar.retry" => handle_retry,
            _ => return None,
        };
    let result = match state.pages.calendar.refresh(state.store.as_ref()) {
        Ok(()) => handler(state, req),
        Err(e) => Err(e),
    };
    Some(respond(&req.id, result))
}
