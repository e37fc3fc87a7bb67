pub mod core;
pub mod export;
pub mod grading;
pub mod logo;
pub mod report;
pub mod roster;

use crate::grading::GradeScale;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// `params.scale` if given, otherwise the session's active scale.
fn scale_param(state: &AppState, req: &Request) -> Result<GradeScale, serde_json::Value> {
    match req.params.get("scale") {
        None | Some(serde_json::Value::Null) => Ok(state.session.scale()),
        Some(v) => {
            let raw = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            GradeScale::parse(&raw).ok_or_else(|| {
                err(
                    &req.id,
                    "bad_params",
                    "scale must be one of: vigesimal, quinary",
                    Some(json!({ "scale": v })),
                )
            })
        }
    }
}
