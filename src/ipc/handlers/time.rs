use serde_json::json;

use crate::ipc::error::{bad_params, codec_err, ok};
use crate::ipc::types::{AppState, Request};
use crate::timefmt::{self, TimeError};

fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

fn respond(req: &Request, key: &str, out: Result<String, TimeError>) -> serde_json::Value {
    match out {
        Ok(value) => ok(&req.id, json!({ key: value })),
        Err(e) => codec_err(&req.id, &e),
    }
}

fn handle_to_standard(req: &Request) -> serde_json::Value {
    let Some(military) = str_param(req, "military") else {
        return bad_params(&req.id, "missing params.military");
    };
    respond(req, "standard", timefmt::to_standard(military))
}

fn handle_to_military(req: &Request) -> serde_json::Value {
    let Some(standard) = str_param(req, "standard") else {
        return bad_params(&req.id, "missing params.standard");
    };
    respond(req, "military", timefmt::to_military(standard))
}

fn handle_to_standard_range(req: &Request) -> serde_json::Value {
    let (Some(start), Some(end)) = (str_param(req, "start"), str_param(req, "end")) else {
        return bad_params(&req.id, "missing params.start / params.end");
    };
    respond(req, "range", timefmt::to_standard_range(start, end))
}

fn handle_to_military_range(req: &Request) -> serde_json::Value {
    let Some(range) = str_param(req, "range") else {
        return bad_params(&req.id, "missing params.range");
    };
    match timefmt::to_military_range(range) {
        Ok((start, end)) => ok(&req.id, json!({ "start": start, "end": end })),
        Err(e) => codec_err(&req.id, &e),
    }
}

fn handle_parse_entry(state: &AppState, req: &Request) -> serde_json::Value {
    let Some(entry) = str_param(req, "entry") else {
        return bad_params(&req.id, "missing params.entry");
    };
    respond(
        req,
        "standard",
        timefmt::parse_entry(entry, state.meridiem),
    )
}

fn handle_parse_date(req: &Request) -> serde_json::Value {
    let Some(entry) = str_param(req, "entry") else {
        return bad_params(&req.id, "missing params.entry");
    };
    respond(req, "date", timefmt::parse_date(entry))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "time.toStandard" => Some(handle_to_standard(req)),
        "time.toMilitary" => Some(handle_to_military(req)),
        "time.toStandardRange" => Some(handle_to_standard_range(req)),
        "time.toMilitaryRange" => Some(handle_to_military_range(req)),
        "time.parseEntry" => Some(handle_parse_entry(state, req)),
        "date.parse" => Some(handle_parse_date(req)),
        _ => None,
    }
}
