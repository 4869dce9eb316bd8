use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type TryHandle = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

/// Method families, asked in order until one claims the request.
const FAMILIES: &[TryHandle] = &[
    handlers::core::try_handle,
    handlers::store::try_handle,
    handlers::nav::try_handle,
    handlers::dashboard::try_handle,
    handlers::students::try_handle,
    handlers::classes::try_handle,
    handlers::notes::try_handle,
    handlers::resources::try_handle,
    handlers::calendar::try_handle,
    handlers::settings::try_handle,
    handlers::backup::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(id = %req.id, method = %req.method, "request");

    for try_handle in FAMILIES {
        if let Some(resp) = try_handle(state, &req) {
            return resp;
        }
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
