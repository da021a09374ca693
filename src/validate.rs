use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::ConstraintCatalog;
use crate::timefmt::{self, MeridiemPolicy};

/// Wire tags match the fact-type configuration the admin UI consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Number,
    UniqueText,
    Dropdown,
    Constraint,
    StartEnd,
    Date,
    MinMax,
}

/// Static description of one form field. Descriptors are configuration,
/// not user data; see `config` for the built-in sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub multiple_values: bool,
    /// Dropdown only: the closed answer list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_answers: Vec<String>,
    /// Constraint only: fact type whose catalog supplies the choices.
    /// Defaults to the field key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Constraint only: submission may downgrade the link to low priority.
    #[serde(default)]
    pub can_be_elective: bool,
}

impl FieldDef {
    /// Catalog lookup key for a Constraint field.
    pub fn catalog_source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.key)
    }
}

/// Terminal per-field error kinds. Message rendering and translation stay
/// with the host UI; these tags are the whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    #[error("a value is required")]
    Required,
    #[error("must be a positive whole number")]
    PositiveInteger,
    #[error("must not be negative")]
    NegativeValue,
    #[error("minimum exceeds maximum")]
    MinMaxOrder,
    #[error("must match one of the listed choices")]
    ListItem,
    #[error("value is already in use")]
    UniqueValue,
    #[error("unrecognized time")]
    InvalidTime,
    #[error("unrecognized date")]
    InvalidDate,
}

/// Outcome of checking one field. MinMax fields report their two bounds
/// independently in `min_error`/`max_error`; every other type uses
/// `error`. `normalized` carries the canonical form when validation also
/// canonicalizes (times, dates) — the caller decides what to store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_error: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_error: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Value>,
}

impl Validation {
    pub fn ok() -> Self {
        Self::default()
    }

    fn fail(error: FieldError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    fn canonical(value: impl Into<Value>) -> Self {
        Self {
            normalized: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.min_error.is_none() && self.max_error.is_none()
    }
}

/// What a check may consult besides the value itself.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    /// Currently-loaded records of the same fact type, for uniqueness.
    pub peers: &'a [Value],
    /// Catalog behind a Constraint field, when one is loaded.
    pub catalog: Option<&'a ConstraintCatalog>,
    pub meridiem: MeridiemPolicy,
}

impl<'a> FieldContext<'a> {
    pub fn new() -> Self {
        Self {
            peers: &[],
            catalog: None,
            meridiem: MeridiemPolicy::default(),
        }
    }
}

impl<'a> Default for FieldContext<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Empty means "nothing entered": JSON null or the empty string. Zero and
/// whitespace both count as entered.
fn is_empty(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("")
}

/// String form used for comparisons against stored records, which may hold
/// numbers where the form holds text.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate one field value against its descriptor. Pure: the result says
/// what to store, nothing is mutated.
pub fn check(def: &FieldDef, value: &Value, ctx: &FieldContext) -> Validation {
    // MinMax carries its own required handling per bound.
    if def.field_type == FieldType::MinMax {
        return check_min_max(def, value);
    }

    if is_empty(value) {
        return if def.required {
            Validation::fail(FieldError::Required)
        } else {
            Validation::ok()
        };
    }

    match def.field_type {
        FieldType::Text => Validation::ok(),
        FieldType::Number => check_number(value),
        FieldType::UniqueText => check_unique(def, value, ctx.peers),
        FieldType::Dropdown => check_dropdown(def, value),
        FieldType::Constraint => check_constraint(value, ctx.catalog),
        FieldType::StartEnd => match timefmt::parse_entry(&text_of(value), ctx.meridiem) {
            Ok(standard) => Validation::canonical(standard),
            Err(_) => Validation::fail(FieldError::InvalidTime),
        },
        FieldType::Date => match timefmt::parse_date(&text_of(value)) {
            Ok(date) => Validation::canonical(date),
            Err(_) => Validation::fail(FieldError::InvalidDate),
        },
        FieldType::MinMax => unreachable!("handled above"),
    }
}

fn check_number(value: &Value) -> Validation {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Validation::ok(),
        _ => Validation::fail(FieldError::PositiveInteger),
    }
}

fn check_unique(def: &FieldDef, value: &Value, peers: &[Value]) -> Validation {
    let mine = text_of(value);
    for record in peers {
        let Some(theirs) = record.get(&def.key) else {
            continue;
        };
        if !theirs.is_null() && text_of(theirs) == mine {
            return Validation::fail(FieldError::UniqueValue);
        }
    }
    Validation::ok()
}

fn check_dropdown(def: &FieldDef, value: &Value) -> Validation {
    let chosen = value.as_str();
    if def
        .possible_answers
        .iter()
        .any(|answer| Some(answer.as_str()) == chosen)
    {
        Validation::ok()
    } else {
        Validation::fail(FieldError::ListItem)
    }
}

fn check_constraint(value: &Value, catalog: Option<&ConstraintCatalog>) -> Validation {
    let Some(catalog) = catalog else {
        // No record list has been delivered yet; nothing can match.
        return Validation::fail(FieldError::ListItem);
    };
    match value.as_str() {
        Some(label) if catalog.contains_label(label) => Validation::ok(),
        _ => Validation::fail(FieldError::ListItem),
    }
}

/// Numeric bound of a {min,max} value, or None when that side is empty.
fn bound_of(value: &Value, side: &str) -> Option<f64> {
    match value.get(side)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// One call validates both bounds; each side reports independently so the
/// form can mark the min and max inputs separately.
fn check_min_max(def: &FieldDef, value: &Value) -> Validation {
    let min = bound_of(value, "min");
    let max = bound_of(value, "max");
    let mut out = Validation::ok();

    out.min_error = match min {
        None if def.required => Some(FieldError::Required),
        None => None,
        Some(m) if m < 0.0 => Some(FieldError::NegativeValue),
        Some(m) => match max {
            Some(x) if m > x => Some(FieldError::MinMaxOrder),
            _ => None,
        },
    };
    out.max_error = match max {
        None if def.required => Some(FieldError::Required),
        None => None,
        Some(x) if x < 1.0 => Some(FieldError::PositiveInteger),
        Some(x) => match min {
            Some(m) if m > x => Some(FieldError::MinMaxOrder),
            _ => None,
        },
    };
    out
}
