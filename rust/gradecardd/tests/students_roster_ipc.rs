use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradecardd");
    let mut child = Command::new(exe)
        .env_remove("GRADECARDD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradecardd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn add_two_students_and_classify_them() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let a = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.add",
        json!({ "name": "Ana", "grade": "18" }),
    );
    assert_eq!(a["added"], true);
    assert_eq!(a["coerced"], false);
    let b = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.add",
        json!({ "name": "Luis", "grade": "5" }),
    );
    assert_eq!(
        b["students"],
        json!([
            { "name": "Ana", "grade": 18 },
            { "name": "Luis", "grade": 5 }
        ])
    );

    let list = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let rows = list["students"].as_array().expect("students array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["position"], "01");
    assert_eq!(rows[0]["band"]["code"], "AD");
    assert_eq!(rows[0]["formBadge"], "AD = 18");
    assert_eq!(rows[1]["band"]["code"], "C");
    assert_eq!(rows[1]["band"]["label"], "Bajo");
}

#[test]
fn blank_names_are_ignored_without_error() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (i, name) in ["", "   ", "\t"].iter().enumerate() {
        let res = request_ok(
            &mut stdin,
            &mut reader,
            &format!("b{}", i),
            "students.add",
            json!({ "name": name, "grade": "10" }),
        );
        assert_eq!(res["added"], false);
        assert_eq!(res["students"], json!([]));
    }
    let health = request_ok(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(health["studentCount"], 0);
}

#[test]
fn absent_sentinel_and_unreadable_grades() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let np = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.add",
        json!({ "name": "Fergie", "grade": "NP" }),
    );
    assert_eq!(np["students"][0]["grade"], serde_json::Value::Null);
    assert_eq!(np["coerced"], false);

    let junk = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.add",
        json!({ "name": "Kristhel", "grade": "abc" }),
    );
    assert_eq!(junk["added"], true);
    assert_eq!(junk["coerced"], true);
    assert_eq!(junk["students"][1]["grade"], 0);

    let list = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(list["students"][0]["formBadge"], "NP");
    assert_eq!(list["students"][0]["band"]["label"], "No se presentó");
}

#[test]
fn remove_middle_keeps_order_and_add_remove_restores() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let mut ids = Vec::new();
    for (i, (name, grade)) in [("A", "1"), ("B", "2"), ("C", "3")].iter().enumerate() {
        let res = request_ok(
            &mut stdin,
            &mut reader,
            &format!("a{}", i),
            "students.add",
            json!({ "name": name, "grade": grade }),
        );
        ids.push(res["studentId"].as_str().expect("studentId").to_string());
    }
    let before = request_ok(&mut stdin, &mut reader, "g1", "report.get", json!({}))["students"].clone();

    let extra = request_ok(
        &mut stdin,
        &mut reader,
        "x",
        "students.add",
        json!({ "name": "D", "grade": "4" }),
    );
    let extra_id = extra["studentId"].as_str().expect("studentId").to_string();
    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "r1",
        "students.remove",
        json!({ "studentId": extra_id }),
    );
    assert_eq!(removed["removed"], true);
    assert_eq!(removed["students"], before);

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "r2",
        "students.remove",
        json!({ "studentId": ids[1] }),
    );
    assert_eq!(
        removed["students"],
        json!([{ "name": "A", "grade": 1 }, { "name": "C", "grade": 3 }])
    );

    // Second removal of the same id is a silent no-op.
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "r3",
        "students.remove",
        json!({ "studentId": ids[1] }),
    );
    assert_eq!(again["removed"], false);
    assert_eq!(again["students"].as_array().map(|a| a.len()), Some(2));
}

#[test]
fn null_grade_is_stored_as_absent() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.add",
        json!({ "name": "Ana", "grade": null }),
    );
    assert_eq!(res["added"], true);
    assert_eq!(res["coerced"], false);
    assert_eq!(res["students"], json!([{ "name": "Ana", "grade": null }]));

    // Feeding a snapshot row back in keeps the student absent.
    let row = res["students"][0].clone();
    let again = request_ok(&mut stdin, &mut reader, "2", "students.add", row);
    assert_eq!(again["coerced"], false);
    assert_eq!(again["students"][1]["grade"], serde_json::Value::Null);

    let list = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(list["students"][0]["band"]["code"], "NP");
}
