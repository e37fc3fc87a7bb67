use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::logo::{Logo, LogoError};
use serde_json::json;
use std::path::Path;

fn logo_err(req: &Request, e: LogoError) -> serde_json::Value {
    tracing::warn!(error = %e, "logo rejected");
    err(&req.id, e.code(), e.to_string(), None)
}

fn accepted(state: &mut AppState, req: &Request, logo: Logo) -> serde_json::Value {
    let result = json!({
        "hasLogo": true,
        "mime": logo.mime,
        "bytes": logo.bytes,
        "sha256": logo.sha256,
        "oversized": logo.oversized(),
    });
    state.session.set_logo(logo);
    ok(&req.id, result)
}

/// Uploading while a logo is set replaces it.
fn handle_logo_upload(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match Logo::from_file(Path::new(path)) {
        Ok(logo) => accepted(state, req, logo),
        Err(e) => logo_err(req, e),
    }
}

fn handle_logo_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data_url = match required_str(req, "dataUrl") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match Logo::from_data_url(data_url) {
        Ok(logo) => accepted(state, req, logo),
        Err(e) => logo_err(req, e),
    }
}

fn handle_logo_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session.remove_logo();
    ok(&req.id, json!({ "hasLogo": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "logo.upload" => Some(handle_logo_upload(state, req)),
        "logo.set" => Some(handle_logo_set(state, req)),
        "logo.remove" => Some(handle_logo_remove(state, req)),
        _ => None,
    }
}
