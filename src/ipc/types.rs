use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::CatalogStore;
use crate::timefmt::MeridiemPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Session state for one host UI: the loaded record lists, the catalogs
/// derived from them, and the time-entry policy.
pub struct AppState {
    pub meridiem: MeridiemPolicy,
    /// Raw records by fact type, as last delivered by the transport.
    /// Uniqueness checks scan these.
    pub records: HashMap<String, Vec<Value>>,
    pub catalogs: CatalogStore,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            meridiem: MeridiemPolicy::default(),
            records: HashMap::new(),
            catalogs: CatalogStore::with_builtin_days(),
        }
    }
}
