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

fn request(
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
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn classify_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    grade: serde_json::Value,
    scale: &str,
) -> String {
    let v = request(
        stdin,
        reader,
        "c",
        "grading.classify",
        json!({ "grade": grade, "scale": scale }),
    );
    assert_eq!(v["ok"], true, "{}", v);
    v["result"]["band"]["code"]
        .as_str()
        .expect("band code")
        .to_string()
}

#[test]
fn twenty_point_boundaries() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let cases = [
        (json!(17), "AD"),
        (json!(16), "A"),
        (json!(13), "A"),
        (json!(12), "B"),
        (json!(9), "B"),
        (json!(8), "C"),
        (json!(0), "C"),
        (json!(-5), "C"),
        (json!(null), "NP"),
        (json!("NP"), "NP"),
    ];
    for (grade, want) in cases {
        assert_eq!(
            classify_code(&mut stdin, &mut reader, grade.clone(), "vigesimal"),
            want,
            "grade {}",
            grade
        );
    }
}

#[test]
fn five_point_labels() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    for (grade, want) in [(4, "Excelente"), (3, "Regular"), (2, "Regular"), (1, "Bajo"), (0, "Bajo")] {
        let v = request(
            &mut stdin,
            &mut reader,
            "q",
            "grading.classify",
            json!({ "grade": grade, "scale": "quinary" }),
        );
        assert_eq!(v["result"]["band"]["label"], want, "grade {}", grade);
    }
}

#[test]
fn scale_switch_changes_legend_options_and_badges() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let legend = request(&mut stdin, &mut reader, "1", "grading.legend", json!({}));
    assert_eq!(legend["result"]["legend"].as_array().map(|a| a.len()), Some(4));

    let cfg = request(
        &mut stdin,
        &mut reader,
        "2",
        "report.configure",
        json!({ "scale": "quinary" }),
    );
    assert_eq!(cfg["result"]["scale"], "quinary");

    let legend = request(&mut stdin, &mut reader, "3", "grading.legend", json!({}));
    let entries = legend["result"]["legend"].as_array().expect("legend");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["caption"], "AD Excelente (4-5)");

    let options = request(&mut stdin, &mut reader, "4", "grading.options", json!({}));
    let opts = options["result"]["options"].as_array().expect("options");
    assert_eq!(opts.len(), 6);
    assert!(opts.iter().all(|o| o["value"] != "NP"));

    let options = request(
        &mut stdin,
        &mut reader,
        "5",
        "grading.options",
        json!({ "scale": "vigesimal" }),
    );
    let opts = options["result"]["options"].as_array().expect("options");
    assert_eq!(opts[0]["value"], "NP");
    assert_eq!(opts[0]["label"], "No se presentó");
    assert_eq!(opts[21]["label"], "20 (AD)");

    let _ = request(
        &mut stdin,
        &mut reader,
        "6",
        "students.add",
        json!({ "name": "Danae", "grade": "4" }),
    );
    let preview = request(&mut stdin, &mut reader, "7", "report.preview", json!({}));
    assert_eq!(preview["result"]["report"]["rows"][0]["badge"], "AD = 4");
}

#[test]
fn bad_scale_and_grade_params_are_rejected() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let v = request(
        &mut stdin,
        &mut reader,
        "1",
        "grading.classify",
        json!({ "grade": 10, "scale": "hundred" }),
    );
    assert_eq!(v["ok"], false);
    assert_eq!(v["error"]["code"], "bad_params");

    let v = request(
        &mut stdin,
        &mut reader,
        "2",
        "grading.classify",
        json!({ "grade": "ten" }),
    );
    assert_eq!(v["error"]["code"], "bad_params");

    let v = request(
        &mut stdin,
        &mut reader,
        "3",
        "report.configure",
        json!({ "scale": "hundred" }),
    );
    assert_eq!(v["error"]["code"], "bad_params");
    let health = request(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(health["result"]["scale"], "vigesimal");
}
