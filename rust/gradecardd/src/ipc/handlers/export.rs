use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::{ExportBusy, ExportStatus};
use serde_json::json;
use std::path::PathBuf;

fn out_dir_param(req: &Request) -> Option<PathBuf> {
    req.params
        .get("outDir")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

fn busy(req: &Request, e: ExportBusy) -> serde_json::Value {
    err(
        &req.id,
        "export_in_progress",
        e.to_string(),
        Some(json!({ "jobId": e.0.to_string() })),
    )
}

fn handle_export_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.start_export(out_dir_param(req)) {
        Ok(Some(started)) => ok(
            &req.id,
            json!({
                "started": true,
                "jobId": started.job_id.to_string(),
                "fileName": started.file_name,
            }),
        ),
        Ok(None) => ok(&req.id, json!({ "started": false })),
        Err(e) => busy(req, e),
    }
}

fn handle_export_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.session.export_status()))
}

/// Start and wait; the loop blocks until the file is written.
fn handle_export_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.start_export(out_dir_param(req)) {
        Ok(Some(_)) => {}
        Ok(None) => return ok(&req.id, json!({ "exported": false })),
        Err(e) => return busy(req, e),
    }
    match state.session.wait_export() {
        ExportStatus::Done { job_id, outcome } => ok(
            &req.id,
            json!({
                "exported": true,
                "jobId": job_id,
                "path": outcome.path,
                "fileName": outcome.file_name,
                "bytes": outcome.bytes,
                "sha256": outcome.sha256,
                "exportedAt": outcome.exported_at,
                "placement": outcome.placement,
            }),
        ),
        ExportStatus::Failed { job_id, message } => err(
            &req.id,
            "export_failed",
            message,
            Some(json!({ "jobId": job_id })),
        ),
        other => err(
            &req.id,
            "no_export_job",
            "export finished without a result",
            Some(json!(other)),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.start" => Some(handle_export_start(state, req)),
        "export.status" => Some(handle_export_status(state, req)),
        "export.pdf" => Some(handle_export_pdf(state, req)),
        _ => None,
    }
}
