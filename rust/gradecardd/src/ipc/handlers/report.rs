use super::scale_param;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn config_json(state: &AppState) -> serde_json::Value {
    let cfg = state.session.report();
    json!({
        "title": cfg.title,
        "subtitle": cfg.subtitle,
        "scale": cfg.scale,
        "hasLogo": cfg.logo.is_some(),
        "students": cfg.students,
    })
}

fn handle_report_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, config_json(state))
}

fn optional_text<'a>(req: &'a Request, key: &str) -> Result<Option<&'a str>, serde_json::Value> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be a string", key),
            None,
        )),
    }
}

/// Title and subtitle are free text; empty strings are stored as typed.
fn handle_report_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let title = match optional_text(req, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subtitle = match optional_text(req, "subtitle") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let scale = match req.params.get("scale") {
        None => None,
        Some(_) => match scale_param(state, req) {
            Ok(s) => Some(s),
            Err(resp) => return resp,
        },
    };

    if let Some(t) = title {
        state.session.set_title(t);
    }
    if let Some(s) = subtitle {
        state.session.set_subtitle(s);
    }
    if let Some(s) = scale {
        state.session.set_scale(s);
    }
    ok(&req.id, config_json(state))
}

fn handle_report_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let model = state.session.preview();
    let svg = model.render_svg();
    let (width, height) = model.size();
    ok(
        &req.id,
        json!({
            "report": model,
            "svg": svg,
            "width": width,
            "height": height,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.get" => Some(handle_report_get(state, req)),
        "report.configure" => Some(handle_report_configure(state, req)),
        "report.preview" => Some(handle_report_preview(state, req)),
        _ => None,
    }
}
