use serde_json::json;

use crate::timefmt::TimeError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Missing or mis-shaped params; the most common handler failure.
pub fn bad_params(id: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, "bad_params", message, None)
}

/// A codec rejection, carried as its distinguished error kind so the host
/// can mark the field without parsing the message.
pub fn codec_err(id: &str, e: &TimeError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), None)
}
