use super::required_str;
use crate::grading::{self, ABSENT_SENTINEL};
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use uuid::Uuid;

fn snapshot_json(state: &AppState) -> serde_json::Value {
    json!(state.session.report().students)
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // The form sends the select value as a string; accept bare numbers too.
    let grade = match req.params.get("grade") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        // Snapshots report an absent grade as null; accept it back.
        Some(serde_json::Value::Null) => ABSENT_SENTINEL.to_string(),
        _ => String::new(),
    };

    match state.session.add_student(name, &grade) {
        Some(added) => ok(
            &req.id,
            json!({
                "added": true,
                "studentId": added.id.to_string(),
                "coerced": added.coerced,
                "students": snapshot_json(state),
            }),
        ),
        None => ok(
            &req.id,
            json!({
                "added": false,
                "coerced": false,
                "students": snapshot_json(state),
            }),
        ),
    }
}

fn handle_students_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // An id that is not even a UUID cannot match any student.
    let removed = match Uuid::parse_str(raw) {
        Ok(id) => state.session.remove_student(id),
        Err(_) => false,
    };
    ok(
        &req.id,
        json!({
            "removed": removed,
            "students": snapshot_json(state),
        }),
    )
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scale = state.session.scale();
    let students: Vec<serde_json::Value> = state
        .session
        .roster()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            json!({
                "id": s.id.to_string(),
                "position": format!("{:02}", i + 1),
                "name": s.name,
                "grade": s.grade.as_option(),
                "formBadge": grading::form_badge(scale, s.grade),
                "band": grading::classify(scale, s.grade),
            })
        })
        .collect();
    ok(&req.id, json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.add" => Some(handle_students_add(state, req)),
        "students.remove" => Some(handle_students_remove(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        _ => None,
    }
}
