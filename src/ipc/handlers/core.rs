use serde_json::json;

use crate::ipc::error::{bad_params, ok};
use crate::ipc::types::{AppState, Request};
use crate::timefmt::MeridiemPolicy;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "factTypesLoaded": state.records.len(),
        }),
    )
}

fn handle_policy_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "amStart": state.meridiem.am_start,
            "amEnd": state.meridiem.am_end,
        }),
    )
}

/// Adjust which bare hours read as morning. Both bounds are clock hours;
/// an inverted window would make every bare entry PM, so reject it.
fn handle_policy_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let get_hour = |key: &str| req.params.get(key).and_then(|v| v.as_u64());
    let (Some(am_start), Some(am_end)) = (get_hour("amStart"), get_hour("amEnd")) else {
        return bad_params(&req.id, "missing params.amStart / params.amEnd");
    };
    if am_start > 12 || am_end > 12 || am_start > am_end {
        return bad_params(&req.id, "amStart..amEnd must be an ordered window within 0..=12");
    }

    state.meridiem = MeridiemPolicy {
        am_start: am_start as u32,
        am_end: am_end as u32,
    };
    handle_policy_get(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "policy.get" => Some(handle_policy_get(state, req)),
        "policy.set" => Some(handle_policy_set(state, req)),
        _ => None,
    }
}
