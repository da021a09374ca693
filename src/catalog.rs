use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::timefmt;

fn de_stringy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }
    Ok(Option::<Raw>::deserialize(d)?.map(|r| match r {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

fn de_military<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }
    Ok(Option::<Raw>::deserialize(d)?.map(|r| match r {
        Raw::Text(s) => s,
        // Stored times are integers in some backends; 900 means 0900.
        Raw::Int(n) => format!("{:04}", n),
    }))
}

/// One raw backend entity, as delivered to a constraint picker. Everything
/// except the id is optional; which fields show up depends on the fact type
/// behind the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstraintRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_stringy")]
    pub room_number: Option<String>,
    #[serde(default, deserialize_with = "de_military")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "de_military")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub days: Vec<String>,
}

impl ConstraintRecord {
    /// Display label for the picker. The day prefix comes first so records
    /// sharing a name but differing by day stay tellable apart before any
    /// #id suffixing kicks in.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut push = |s: &str| {
            if !s.is_empty() {
                parts.push(s.to_string());
            }
        };

        if !self.days.is_empty() {
            push(&timefmt::encode_days(&self.days));
        }
        if let Some(v) = &self.first_name {
            push(v);
        }
        if let Some(v) = &self.last_name {
            push(v);
        }
        if let Some(v) = &self.name {
            push(v);
        }
        if let Some(v) = &self.room_number {
            push(v);
        }
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            // A garbled stored time never poisons the catalog; the range is
            // simply left off this record's label.
            if let Ok(range) = timefmt::to_standard_range(start, end) {
                push(&range);
            }
        }
        if let Some(v) = &self.course {
            push(v);
        }

        parts.join(" ").trim().to_string()
    }
}

/// Immutable label<->id catalog for one fact type. Rebuilt wholesale from
/// the record list; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintCatalog {
    /// Unique display labels, in record order, with superseded bare forms
    /// dropped.
    pub labels: Vec<String>,
    /// Every key ever assigned, including superseded bare labels, so a
    /// chosen label always resolves back to its id.
    pub id_by_label: HashMap<String, i64>,
}

impl ConstraintCatalog {
    pub fn resolve(&self, label: &str) -> Option<i64> {
        self.id_by_label.get(label).copied()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Build the catalog for a record list. Colliding labels (same text,
/// different id) are disambiguated with a " #id" suffix on both sides; the
/// bare key stays in the map, superseded, so stale selections still
/// resolve. Empty input is a valid empty catalog, not an error.
pub fn build_catalog(records: &[ConstraintRecord]) -> ConstraintCatalog {
    let mut id_by_label: HashMap<String, i64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for rec in records {
        let label = rec.label();
        match id_by_label.get(&label).copied() {
            None => {
                id_by_label.insert(label.clone(), rec.id);
                order.push(label);
            }
            Some(existing) if existing == rec.id => {}
            Some(existing) => {
                let prior = format!("{} #{}", label, existing);
                if !id_by_label.contains_key(&prior) {
                    id_by_label.insert(prior.clone(), existing);
                    order.push(prior);
                }
                let fresh = format!("{} #{}", label, rec.id);
                if !id_by_label.contains_key(&fresh) {
                    id_by_label.insert(fresh.clone(), rec.id);
                    order.push(fresh);
                }
            }
        }
    }

    // Keep only the deepest non-superseded form per key: a key whose own
    // "#<mapped id>" variant exists has been replaced by it.
    let labels = order
        .iter()
        .filter(|key| {
            let id = id_by_label[key.as_str()];
            !id_by_label.contains_key(&format!("{} #{}", key, id))
        })
        .cloned()
        .collect();

    ConstraintCatalog { labels, id_by_label }
}

/// The seven weekdays as a ready-made catalog for day-constraint fields.
pub fn weekday_catalog() -> ConstraintCatalog {
    let records: Vec<ConstraintRecord> = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| ConstraintRecord {
        id: i as i64 + 1,
        name: Some(name.to_string()),
        ..Default::default()
    })
    .collect();
    build_catalog(&records)
}

/// Per-fact-type catalog slots with refresh tokens. Record lists arrive
/// from the transport in whatever order its callbacks fire; the token rule
/// makes the last *requested* rebuild win, not the last one to finish.
#[derive(Debug, Default)]
pub struct CatalogStore {
    catalogs: HashMap<String, ConstraintCatalog>,
    pending: HashMap<String, u64>,
    next_token: u64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fact_type: &str) -> Option<&ConstraintCatalog> {
        self.catalogs.get(fact_type)
    }

    /// Stamp a refresh for this fact type. The returned token must
    /// accompany the commit.
    pub fn begin_refresh(&mut self, fact_type: &str) -> u64 {
        self.next_token += 1;
        self.pending.insert(fact_type.to_string(), self.next_token);
        self.next_token
    }

    /// Install a freshly built catalog. Returns false (and drops the
    /// catalog) when a newer refresh has been stamped since the token was
    /// issued.
    pub fn commit(&mut self, fact_type: &str, token: u64, catalog: ConstraintCatalog) -> bool {
        if self.pending.get(fact_type) != Some(&token) {
            return false;
        }
        self.catalogs.insert(fact_type.to_string(), catalog);
        true
    }

    /// Begin-and-commit in one step, for callers that rebuild inline.
    pub fn install(&mut self, fact_type: &str, catalog: ConstraintCatalog) -> u64 {
        let token = self.begin_refresh(fact_type);
        self.commit(fact_type, token, catalog);
        token
    }

    /// Seed the fixed weekday catalog under the "day" fact type.
    pub fn with_builtin_days() -> Self {
        let mut store = Self::new();
        store.install("day", weekday_catalog());
        store
    }
}
