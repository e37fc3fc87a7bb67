use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "scale": state.session.scale(),
            "studentCount": state.session.roster().len(),
            "mounted": state.session.is_mounted(),
        }),
    )
}

fn handle_session_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session.reset();
    tracing::info!("session reset");
    ok(
        &req.id,
        json!({
            "title": state.session.report().title,
            "subtitle": state.session.report().subtitle,
            "scale": state.session.scale(),
            "students": [],
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.reset" => Some(handle_session_reset(state, req)),
        _ => None,
    }
}
