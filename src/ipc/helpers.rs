use crate::calendar::grid;
use crate::error::{AppError, AppResult};
use crate::i18n::Language;
use crate::ipc::types::{AppState, Request};
use crate::model::Millis;
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn str_param<'a>(req: &'a Request, key: &str) -> AppResult<&'a str> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::bad_params(format!("missing params.{}", key)))
}

pub fn opt_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn i64_param(req: &Request, key: &str) -> AppResult<i64> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AppError::bad_params(format!("missing params.{}", key)))
}

pub fn object_param<'a>(req: &'a Request, key: &str) -> AppResult<&'a Map<String, Value>> {
    req.params
        .get(key)
        .and_then(|v| v.as_object())
        .ok_or_else(|| AppError::bad_params(format!("params.{} must be an object", key)))
}

pub fn date_param(req: &Request, key: &str) -> AppResult<NaiveDate> {
    let raw = str_param(req, key)?;
    grid::parse_date_field(raw)
        .ok_or_else(|| AppError::bad_params(format!("params.{} must be YYYY-MM-DD", key)))
}

/// Deserializes the whole params object into a form struct.
pub fn parse_params<T: DeserializeOwned>(req: &Request) -> AppResult<T> {
    serde_json::from_value(req.params.clone()).map_err(|e| AppError::bad_params(e.to_string()))
}

pub fn parse_field<T: DeserializeOwned>(req: &Request, key: &str) -> AppResult<T> {
    let v = req
        .params
        .get(key)
        .cloned()
        .ok_or_else(|| AppError::bad_params(format!("missing params.{}", key)))?;
    serde_json::from_value(v).map_err(|e| AppError::bad_params(format!("params.{}: {}", key, e)))
}

pub fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Io(e.into()))
}

/// `params.language` when given, else the configured UI language.
pub fn language(state: &AppState, req: &Request) -> AppResult<Language> {
    match opt_str(req, "language") {
        Some(raw) => Language::parse(raw)
            .ok_or_else(|| AppError::bad_params("language must be one of: es, eu")),
        None => Ok(state.config.appearance.language),
    }
}

pub fn now_millis() -> Millis {
    Local::now().timestamp_millis()
}
