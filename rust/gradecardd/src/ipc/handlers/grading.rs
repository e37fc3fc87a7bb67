use super::scale_param;
use crate::grading::{self, Grade, ABSENT_SENTINEL};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn grade_param(req: &Request) -> Result<Grade, serde_json::Value> {
    match req.params.get("grade") {
        Some(serde_json::Value::Null) => Ok(Grade::Absent),
        Some(serde_json::Value::String(s)) if s == ABSENT_SENTINEL => Ok(Grade::Absent),
        Some(v) => v.as_i64().map(Grade::Score).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "grade must be an integer, null, or \"NP\"",
                Some(json!({ "grade": v })),
            )
        }),
        None => Err(err(&req.id, "bad_params", "missing grade", None)),
    }
}

fn handle_classify(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scale = match scale_param(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let grade = match grade_param(req) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "scale": scale,
            "band": grading::classify(scale, grade),
            "badge": grading::card_badge(scale, grade),
        }),
    )
}

fn handle_legend(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scale = match scale_param(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let entries: Vec<serde_json::Value> = grading::legend(scale)
        .iter()
        .map(|e| {
            json!({
                "code": e.code,
                "label": e.label,
                "range": e.range,
                "dotColor": e.dot_color,
                "caption": e.caption(),
            })
        })
        .collect();
    ok(&req.id, json!({ "scale": scale, "legend": entries }))
}

fn handle_options(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scale = match scale_param(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({ "scale": scale, "options": grading::grade_options(scale) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grading.classify" => Some(handle_classify(state, req)),
        "grading.legend" => Some(handle_legend(state, req)),
        "grading.options" => Some(handle_options(state, req)),
        _ => None,
    }
}
