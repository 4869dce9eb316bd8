use crate::error::{AppError, AppResult};
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn app_err(id: &str, e: &AppError) -> serde_json::Value {
    tracing::warn!(request_id = id, code = e.code(), error = %e, "request failed");
    err(id, e.code(), e.to_string(), e.details())
}

pub fn respond(id: &str, result: AppResult<serde_json::Value>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => app_err(id, &e),
    }
}
