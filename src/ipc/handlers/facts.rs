use serde_json::json;

use crate::catalog::{build_catalog, ConstraintRecord};
use crate::config;
use crate::ipc::error::{bad_params, err, ok};
use crate::ipc::types::{AppState, Request};

fn fact_type_param<'a>(req: &'a Request) -> Option<&'a str> {
    req.params.get("factType").and_then(|v| v.as_str())
}

fn handle_fact_types_list(req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "factTypes": config::FACT_TYPES }))
}

fn handle_fact_types_fields(req: &Request) -> serde_json::Value {
    let Some(fact_type) = fact_type_param(req) else {
        return bad_params(&req.id, "missing params.factType");
    };
    let Some(fields) = config::fields_for(fact_type) else {
        return err(
            &req.id,
            "not_found",
            format!("unknown fact type: {}", fact_type),
            None,
        );
    };
    match serde_json::to_value(&fields) {
        Ok(fields) => ok(&req.id, json!({ "fields": fields })),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

/// Ingest the raw record list for one fact type. The records back both the
/// uniqueness checks and this fact type's constraint catalog; the catalog
/// rebuild goes through the refresh-token gate so an out-of-order delivery
/// can never clobber a newer one.
fn handle_facts_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(fact_type) = fact_type_param(req) else {
        return bad_params(&req.id, "missing params.factType");
    };
    if config::fields_for(fact_type).is_none() {
        return err(
            &req.id,
            "not_found",
            format!("unknown fact type: {}", fact_type),
            None,
        );
    }
    let Some(raw_records) = req.params.get("records").and_then(|v| v.as_array()) else {
        return bad_params(&req.id, "missing params.records array");
    };

    // Parse at the boundary; one bad record fails the whole delivery so
    // the transport can retry rather than show a half-built picker.
    let mut parsed: Vec<ConstraintRecord> = Vec::with_capacity(raw_records.len());
    for (i, raw) in raw_records.iter().enumerate() {
        match serde_json::from_value::<ConstraintRecord>(raw.clone()) {
            Ok(rec) => parsed.push(rec),
            Err(e) => {
                return err(
                    &req.id,
                    "bad_record",
                    format!("record {}: {}", i, e),
                    Some(json!({ "index": i })),
                );
            }
        }
    }

    let token = state.catalogs.begin_refresh(fact_type);
    let catalog = build_catalog(&parsed);
    let label_count = catalog.labels.len();
    let committed = state.catalogs.commit(fact_type, token, catalog);
    state
        .records
        .insert(fact_type.to_string(), raw_records.clone());

    tracing::debug!(fact_type, records = raw_records.len(), label_count, "facts loaded");
    ok(
        &req.id,
        json!({
            "factType": fact_type,
            "recordCount": raw_records.len(),
            "labelCount": label_count,
            "generation": token,
            "committed": committed,
        }),
    )
}

fn handle_facts_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(fact_type) = fact_type_param(req) else {
        return bad_params(&req.id, "missing params.factType");
    };
    state.records.remove(fact_type);
    let token = state.catalogs.begin_refresh(fact_type);
    state.catalogs.commit(fact_type, token, Default::default());
    ok(&req.id, json!({ "factType": fact_type }))
}

fn handle_catalog_get(state: &AppState, req: &Request) -> serde_json::Value {
    let Some(fact_type) = fact_type_param(req) else {
        return bad_params(&req.id, "missing params.factType");
    };
    let Some(catalog) = state.catalogs.get(fact_type) else {
        return err(
            &req.id,
            "not_found",
            format!("no catalog loaded for: {}", fact_type),
            None,
        );
    };
    match serde_json::to_value(catalog) {
        Ok(catalog) => ok(&req.id, catalog),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

/// A chosen label back to its record id, for submission.
fn handle_catalog_resolve(state: &AppState, req: &Request) -> serde_json::Value {
    let Some(fact_type) = fact_type_param(req) else {
        return bad_params(&req.id, "missing params.factType");
    };
    let Some(label) = req.params.get("label").and_then(|v| v.as_str()) else {
        return bad_params(&req.id, "missing params.label");
    };
    let resolved = state
        .catalogs
        .get(fact_type)
        .and_then(|catalog| catalog.resolve(label));
    match resolved {
        Some(id) => ok(&req.id, json!({ "id": id })),
        None => err(
            &req.id,
            "not_found",
            format!("label not in catalog: {}", label),
            None,
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "factTypes.list" => Some(handle_fact_types_list(req)),
        "factTypes.fields" => Some(handle_fact_types_fields(req)),
        "facts.load" => Some(handle_facts_load(state, req)),
        "facts.clear" => Some(handle_facts_clear(state, req)),
        "catalog.get" => Some(handle_catalog_get(state, req)),
        "catalog.resolve" => Some(handle_catalog_resolve(state, req)),
        _ => None,
    }
}
