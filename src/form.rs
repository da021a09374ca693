use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::catalog::CatalogStore;
use crate::timefmt::{self, MeridiemPolicy};
use crate::validate::{self, FieldDef, FieldType, FieldContext, Validation};

/// One form input as the host UI holds it: a descriptor key, the entered
/// value, and the transient flags a form session tracks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInput {
    pub key: String,
    #[serde(default)]
    pub value: Value,
    /// Extra row cloned onto the form for a multi-value field.
    #[serde(default)]
    pub added_value: bool,
    /// Chosen entry is an elective link, not a hard requirement.
    #[serde(default)]
    pub elective: bool,
}

/// Per-input validation outcome, positionally aligned with the request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub index: usize,
    pub key: String,
    #[serde(flatten)]
    pub validation: Validation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOutcome {
    pub ok: bool,
    pub fields: Vec<FieldReport>,
    /// Wire-shaped fact entry; present only when the whole form passed and
    /// packaging was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Value>,
}

/// Everything form-level checks need from the session.
pub struct FormSession<'a> {
    pub defs: &'a [FieldDef],
    pub peers: &'a [Value],
    pub catalogs: &'a CatalogStore,
    pub meridiem: MeridiemPolicy,
}

impl<'a> FormSession<'a> {
    fn def_for(&self, key: &str) -> Option<&'a FieldDef> {
        self.defs.iter().find(|d| d.key == key)
    }

    fn context_for(&self, def: &FieldDef) -> FieldContext<'_> {
        FieldContext {
            peers: self.peers,
            catalog: match def.field_type {
                FieldType::Constraint => self.catalogs.get(def.catalog_source()),
                _ => None,
            },
            meridiem: self.meridiem,
        }
    }
}

/// Added rows that were left empty, and added rows duplicating a value
/// already present for the same key, contribute nothing; drop them before
/// validation so they can't fail the form.
fn prune(inputs: &[FieldInput]) -> Vec<&FieldInput> {
    let mut seen: HashMap<&str, HashSet<String>> = HashMap::new();
    let mut kept: Vec<&FieldInput> = Vec::new();

    for input in inputs {
        let empty = input.value.is_null() || input.value.as_str() == Some("");
        if input.added_value && empty {
            continue;
        }
        let values = seen.entry(input.key.as_str()).or_default();
        let fingerprint = input.value.to_string();
        if input.added_value && values.contains(&fingerprint) {
            continue;
        }
        values.insert(fingerprint);
        kept.push(input);
    }
    kept
}

/// Validate every input on the form. Unknown keys are an error in the
/// host's configuration, reported through `anyhow` rather than as a field
/// result.
pub fn validate_form(
    session: &FormSession,
    inputs: &[FieldInput],
) -> anyhow::Result<FormOutcome> {
    let mut fields = Vec::with_capacity(inputs.len());
    let mut ok = true;

    for (index, input) in prune(inputs).into_iter().enumerate() {
        let def = session
            .def_for(&input.key)
            .ok_or_else(|| anyhow::anyhow!("unknown field key: {}", input.key))?;
        let validation = validate::check(def, &input.value, &session.context_for(def));
        ok &= validation.is_ok();
        fields.push(FieldReport {
            index,
            key: input.key.clone(),
            validation,
        });
    }

    Ok(FormOutcome {
        ok,
        fields,
        entry: None,
    })
}

/// Validate, then package the form into the wire shape the backend takes:
/// constraint choices become `[{id, priority, active}]` arrays, MinMax
/// splits into `min_<key>`/`max_<key>`, single times go out in military
/// format, everything else passes through. On any field error the entry is
/// withheld and the reports say why.
pub fn prepare_entry(
    session: &FormSession,
    inputs: &[FieldInput],
) -> anyhow::Result<FormOutcome> {
    let kept = prune(inputs);
    let mut outcome = validate_form(session, inputs)?;
    if !outcome.ok {
        return Ok(outcome);
    }

    let mut entry = Map::new();
    for (input, report) in kept.iter().zip(&outcome.fields) {
        let def = session
            .def_for(&input.key)
            .ok_or_else(|| anyhow::anyhow!("unknown field key: {}", input.key))?;
        let empty = input.value.is_null() || input.value.as_str() == Some("");

        match def.field_type {
            FieldType::Constraint => {
                if empty {
                    continue;
                }
                let label = input.value.as_str().unwrap_or_default();
                let catalog = session.catalogs.get(def.catalog_source());
                let Some(id) = catalog.and_then(|c| c.resolve(label)) else {
                    // contains_label passed, so the map must know it too.
                    anyhow::bail!("label did not resolve: {}", label);
                };
                let priority = if def.can_be_elective && input.elective {
                    "low"
                } else {
                    "mandatory"
                };
                let links = entry
                    .entry(def.key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(links) = links {
                    links.push(json!({
                        "id": id,
                        "priority": priority,
                        "active": true,
                    }));
                }
            }
            FieldType::MinMax => {
                entry.insert(
                    format!("min_{}", def.key),
                    input.value.get("min").cloned().unwrap_or(Value::Null),
                );
                entry.insert(
                    format!("max_{}", def.key),
                    input.value.get("max").cloned().unwrap_or(Value::Null),
                );
            }
            FieldType::StartEnd => {
                if empty {
                    entry.insert(def.key.clone(), Value::Null);
                    continue;
                }
                let standard = report
                    .validation
                    .normalized
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("time missing normalized form"))?;
                let military = timefmt::to_military(standard)
                    .map_err(|e| anyhow::anyhow!("normalized time failed conversion: {e}"))?;
                entry.insert(def.key.clone(), Value::String(military));
            }
            FieldType::Date => {
                let value = report
                    .validation
                    .normalized
                    .clone()
                    .unwrap_or_else(|| input.value.clone());
                entry.insert(def.key.clone(), value);
            }
            _ => {
                entry.insert(def.key.clone(), input.value.clone());
            }
        }
    }

    outcome.entry = Some(Value::Object(entry));
    Ok(outcome)
}
