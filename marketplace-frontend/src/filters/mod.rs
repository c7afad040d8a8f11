//! Search/listing filter state and its URL query-string form.
//!
//! Flat filters are plain query parameters. Category-specific attributes
//! travel as one JSON object under the reserved `extraFields` key.

mod params;
mod sync;

pub use params::ParamValue;
pub use sync::{FilterSync, Location, Navigator, ParamBatch, ScrollBehavior};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EXTRA_FIELDS_KEY: &str = "extraFields";
pub const SEARCH_KEY: &str = "search";
pub const LOCATION_KEY: &str = "location";

/// Value of a dynamic filter attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Flag(value)
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        ExtraValue::Number(value.into())
    }
}

impl From<Vec<String>> for ExtraValue {
    fn from(value: Vec<String>) -> Self {
        ExtraValue::List(value)
    }
}

pub type ExtraFields = BTreeMap<String, ExtraValue>;

/// Decoded filters. `search` and `location` live in `query` like any other
/// flat filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub query: BTreeMap<String, String>,
    pub extra_fields: ExtraFields,
}

impl FilterState {
    pub fn has_dynamic_filters(&self) -> bool {
        !self.extra_fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Free-text search, empty when absent.
    pub fn search(&self) -> &str {
        self.get(SEARCH_KEY).unwrap_or_default()
    }

    pub fn location(&self) -> &str {
        self.get(LOCATION_KEY).unwrap_or_default()
    }

    /// Set a flat filter; an empty value removes it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let (key, value) = (key.into(), value.into());
        if value.is_empty() {
            self.query.remove(&key);
        } else {
            self.query.insert(key, value);
        }
        self
    }

    pub fn set_search(&mut self, value: impl Into<String>) -> &mut Self {
        self.set(SEARCH_KEY, value)
    }

    pub fn set_location(&mut self, value: impl Into<String>) -> &mut Self {
        self.set(LOCATION_KEY, value)
    }
}

/// Decode a query string (with or without the leading `?`).
///
/// Never fails: a malformed query string decodes as empty, a malformed
/// `extraFields` payload decodes as no dynamic filters. Both are logged.
pub fn decode(query: &str) -> FilterState {
    let pairs = parse_pairs(query);

    let mut state = FilterState::default();
    let mut extra_raw = None;
    for (key, value) in pairs {
        if key == EXTRA_FIELDS_KEY {
            extra_raw = Some(value);
        } else {
            state.query.insert(key, value);
        }
    }

    if let Some(raw) = extra_raw {
        state.extra_fields = decode_extra_fields(&raw);
    }
    state
}

/// Encode to a query string without the leading `?`. Keys are emitted in
/// sorted order so equal states always produce equal strings.
pub fn encode(state: &FilterState) -> String {
    let mut pairs: Vec<(String, String)> = state
        .query
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if let Some(extra) = encode_extra_fields(&state.extra_fields) {
        pairs.push((EXTRA_FIELDS_KEY.to_string(), extra));
    }

    serialize_pairs(&pairs)
}

pub fn encode_extra_fields(fields: &ExtraFields) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    serde_json::to_string(fields).ok()
}

fn decode_extra_fields(raw: &str) -> ExtraFields {
    let object = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(other) => {
            tracing::warn!(value = %other, "extraFields is not a JSON object, ignoring");
            return ExtraFields::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse extraFields, ignoring");
            return ExtraFields::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<ExtraValue>(value) {
            Ok(value) => Some((key, value)),
            Err(_) => {
                tracing::warn!(field = %key, "Dropping extraFields entry with unsupported value");
                None
            }
        })
        .collect()
}

pub(crate) fn parse_pairs(query: &str) -> Vec<(String, String)> {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return Vec::new();
    }

    serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to parse query string");
        Vec::new()
    })
}

pub(crate) fn serialize_pairs(pairs: &[(String, String)]) -> String {
    serde_urlencoded::to_string(pairs).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize query string");
        String::new()
    })
}
