use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schedulerd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schedulerd");
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
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request(&mut stdin, &mut reader, "2", "policy.get", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "policy.set",
        json!({ "amStart": 6, "amEnd": 11 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "time.toStandard",
        json!({ "military": "1345" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "time.toMilitary",
        json!({ "standard": "01:45PM" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "6",
        "time.toStandardRange",
        json!({ "start": "0900", "end": "1430" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "time.toMilitaryRange",
        json!({ "range": "09:00AM-02:30PM" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "time.parseEntry",
        json!({ "entry": "9:35am" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "date.parse",
        json!({ "entry": "6/15/2026" }),
    );
    let _ = request(&mut stdin, &mut reader, "10", "factTypes.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "11",
        "factTypes.fields",
        json!({ "factType": "course" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "facts.load",
        json!({
            "factType": "teacher",
            "records": [{ "id": 1, "first_name": "Jo", "last_name": "Lee" }]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "catalog.get",
        json!({ "factType": "teacher" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "14",
        "catalog.resolve",
        json!({ "factType": "teacher", "label": "Jo Lee" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "15",
        "field.validate",
        json!({ "factType": "course", "key": "name", "value": "English III" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "16",
        "form.validate",
        json!({
            "factType": "subject",
            "fields": [{ "key": "name", "value": "Math" }]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "17",
        "form.prepare",
        json!({
            "factType": "subject",
            "fields": [{ "key": "name", "value": "Math" }]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "18",
        "facts.clear",
        json!({ "factType": "teacher" }),
    );

    // Unknown methods still come back addressed, flagged not_implemented.
    let unknown = {
        let payload = json!({ "id": "19", "method": "grid.get", "params": {} });
        writeln!(stdin, "{}", payload).expect("write request");
        stdin.flush().expect("flush");
        let mut line = String::new();
        reader.read_line(&mut line).expect("read response");
        serde_json::from_str::<serde_json::Value>(line.trim()).expect("parse json")
    };
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
}
