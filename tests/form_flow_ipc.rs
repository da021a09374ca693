//! Drives the add-a-fact flow the way the host UI does: deliver records,
//! read the picker catalog, validate per field on blur, then package the
//! entry for submission.

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
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn result(resp: &serde_json::Value) -> &serde_json::Value {
    assert_eq!(
        resp.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "request failed: {}",
        resp
    );
    resp.get("result").expect("result body")
}

#[test]
fn add_course_flow_end_to_end() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    // Two teachers share a display name; the picker must disambiguate.
    let loaded = request(
        &mut stdin,
        &mut reader,
        "load-teachers",
        "facts.load",
        json!({
            "factType": "teacher",
            "records": [
                { "id": 1, "first_name": "Jo", "last_name": "Lee" },
                { "id": 2, "first_name": "Jo", "last_name": "Lee" },
                { "id": 3, "first_name": "Sam", "last_name": "Rivera" }
            ]
        }),
    );
    assert_eq!(result(&loaded)["labelCount"], json!(3));

    let catalog = request(
        &mut stdin,
        &mut reader,
        "get-catalog",
        "catalog.get",
        json!({ "factType": "teacher" }),
    );
    let labels = result(&catalog)["labels"].as_array().unwrap().clone();
    assert_eq!(
        labels,
        vec![json!("Jo Lee #1"), json!("Jo Lee #2"), json!("Sam Rivera")]
    );

    // Blur on the constraint field: the superseded bare label is rejected,
    // the disambiguated one passes.
    let bare = request(
        &mut stdin,
        &mut reader,
        "blur-bare",
        "field.validate",
        json!({ "factType": "course", "key": "teacher", "value": "Jo Lee" }),
    );
    assert_eq!(result(&bare)["error"], json!("list_item"));

    let chosen = request(
        &mut stdin,
        &mut reader,
        "blur-chosen",
        "field.validate",
        json!({ "factType": "course", "key": "teacher", "value": "Jo Lee #2" }),
    );
    assert_eq!(result(&chosen)["ok"], json!(true));

    // Submission packages the full form, resolving the label to its id.
    let prepared = request(
        &mut stdin,
        &mut reader,
        "prepare",
        "form.prepare",
        json!({
            "factType": "course",
            "fields": [
                { "key": "name", "value": "Programming I" },
                { "key": "term", "value": "quarter" },
                { "key": "student_count", "value": { "min": 8, "max": 22 } },
                { "key": "teacher", "value": "Jo Lee #2" }
            ]
        }),
    );
    let entry = &result(&prepared)["entry"];
    assert_eq!(entry["min_student_count"], json!(8));
    assert_eq!(entry["max_student_count"], json!(22));
    assert_eq!(
        entry["teacher"],
        json!([{ "id": 2, "priority": "mandatory", "active": true }])
    );

    // catalog.resolve answers the same question for one-off lookups.
    let resolved = request(
        &mut stdin,
        &mut reader,
        "resolve",
        "catalog.resolve",
        json!({ "factType": "teacher", "label": "Jo Lee #1" }),
    );
    assert_eq!(result(&resolved)["id"], json!(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn uniqueness_scans_loaded_records() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "load-rooms",
        "facts.load",
        json!({
            "factType": "classroom",
            "records": [
                { "id": 10, "room_number": 1001 },
                { "id": 11, "room_number": "1002" }
            ]
        }),
    );

    let taken = request(
        &mut stdin,
        &mut reader,
        "taken",
        "field.validate",
        json!({ "factType": "classroom", "key": "room_number", "value": "1001" }),
    );
    assert_eq!(result(&taken)["error"], json!("unique_value"));

    let free = request(
        &mut stdin,
        &mut reader,
        "free",
        "field.validate",
        json!({ "factType": "classroom", "key": "room_number", "value": "1003" }),
    );
    assert_eq!(result(&free)["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn policy_window_changes_bare_hour_inference() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let before = request(
        &mut stdin,
        &mut reader,
        "before",
        "time.parseEntry",
        json!({ "entry": "5" }),
    );
    assert_eq!(result(&before)["standard"], json!("05:00PM"));

    let _ = request(
        &mut stdin,
        &mut reader,
        "widen",
        "policy.set",
        json!({ "amStart": 5, "amEnd": 11 }),
    );

    let after = request(
        &mut stdin,
        &mut reader,
        "after",
        "time.parseEntry",
        json!({ "entry": "5" }),
    );
    assert_eq!(result(&after)["standard"], json!("05:00AM"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn reloading_records_replaces_the_catalog_wholesale() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let first = request(
        &mut stdin,
        &mut reader,
        "first",
        "facts.load",
        json!({
            "factType": "subject",
            "records": [{ "id": 1, "name": "Math" }, { "id": 2, "name": "Art" }]
        }),
    );
    let first_gen = result(&first)["generation"].as_u64().unwrap();

    let second = request(
        &mut stdin,
        &mut reader,
        "second",
        "facts.load",
        json!({
            "factType": "subject",
            "records": [{ "id": 3, "name": "Music" }]
        }),
    );
    assert!(result(&second)["generation"].as_u64().unwrap() > first_gen);

    let catalog = request(
        &mut stdin,
        &mut reader,
        "catalog",
        "catalog.get",
        json!({ "factType": "subject" }),
    );
    assert_eq!(result(&catalog)["labels"], json!(["Music"]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_records_fail_the_delivery_atomically() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "bad",
        "facts.load",
        json!({
            "factType": "subject",
            "records": [{ "id": 1, "name": "Math" }, { "name": "No Id" }]
        }),
    );
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("bad_record"));

    // Nothing was installed.
    let catalog = request(
        &mut stdin,
        &mut reader,
        "catalog",
        "catalog.get",
        json!({ "factType": "subject" }),
    );
    assert_eq!(catalog["ok"], json!(false));

    drop(stdin);
    let _ = child.wait();
}
