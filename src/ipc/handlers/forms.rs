use serde_json::{json, Value};

use crate::config;
use crate::form::{self, FieldInput, FormSession};
use crate::ipc::error::{bad_params, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::validate::{self, FieldContext, FieldType};

fn fact_type_fields(req: &Request) -> Result<(String, Vec<crate::validate::FieldDef>), serde_json::Value> {
    let Some(fact_type) = req.params.get("factType").and_then(|v| v.as_str()) else {
        return Err(bad_params(&req.id, "missing params.factType"));
    };
    let Some(defs) = config::fields_for(fact_type) else {
        return Err(err(
            &req.id,
            "not_found",
            format!("unknown fact type: {}", fact_type),
            None,
        ));
    };
    Ok((fact_type.to_string(), defs))
}

/// Validate one field value on demand (blur). The caller names the field
/// by key; peers and catalogs come from session state.
fn handle_field_validate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (fact_type, defs) = match fact_type_fields(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(key) = req.params.get("key").and_then(|v| v.as_str()) else {
        return bad_params(&req.id, "missing params.key");
    };
    let Some(def) = defs.iter().find(|d| d.key == key) else {
        return err(
            &req.id,
            "not_found",
            format!("unknown field: {}.{}", fact_type, key),
            None,
        );
    };
    let value = req.params.get("value").cloned().unwrap_or(Value::Null);

    let peers = state
        .records
        .get(&fact_type)
        .map(|r| r.as_slice())
        .unwrap_or(&[]);
    let ctx = FieldContext {
        peers,
        catalog: match def.field_type {
            FieldType::Constraint => state.catalogs.get(def.catalog_source()),
            _ => None,
        },
        meridiem: state.meridiem,
    };
    let validation = validate::check(def, &value, &ctx);
    match serde_json::to_value(&validation) {
        Ok(mut body) => {
            body["ok"] = json!(validation.is_ok());
            ok(&req.id, body)
        }
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn parse_inputs(req: &Request) -> Result<Vec<FieldInput>, serde_json::Value> {
    let Some(raw) = req.params.get("fields") else {
        return Err(bad_params(&req.id, "missing params.fields"));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| bad_params(&req.id, format!("bad params.fields: {}", e)))
}

fn run_form(
    state: &mut AppState,
    req: &Request,
    package: bool,
) -> serde_json::Value {
    let (fact_type, defs) = match fact_type_fields(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let inputs = match parse_inputs(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let peers = state
        .records
        .get(&fact_type)
        .map(|r| r.as_slice())
        .unwrap_or(&[]);
    let session = FormSession {
        defs: &defs,
        peers,
        catalogs: &state.catalogs,
        meridiem: state.meridiem,
    };
    let outcome = if package {
        form::prepare_entry(&session, &inputs)
    } else {
        form::validate_form(&session, &inputs)
    };
    match outcome.and_then(|o| Ok(serde_json::to_value(&o)?)) {
        Ok(body) => ok(&req.id, body),
        Err(e) => bad_params(&req.id, e.to_string()),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "field.validate" => Some(handle_field_validate(state, req)),
        "form.validate" => Some(run_form(state, req, false)),
        "form.prepare" => Some(run_form(state, req, true)),
        _ => None,
    }
}
