use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::Details;

/// Spellings a provider uses for "no value"
const NULL_TOKENS: [&str; 4] = ["null", "none", "na", "n/a"];

/// Whether a raw cell counts as absent
pub fn is_null_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || NULL_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// One provider pricing row keyed by provider-native field names.
///
/// Values are kept exactly as the ingestion adapter produced them; the
/// dialects decide what a value means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from a JSON object. Strings are taken verbatim, numbers
    /// and booleans are stringified, nulls are omitted.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::unrecognized("row", value.to_string()))?;

        let mut row = Self::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => row.insert(key.clone(), s.clone()),
                Value::Number(n) => row.insert(key.clone(), n.to_string()),
                Value::Bool(b) => row.insert(key.clone(), b.to_string()),
                other => row.insert(key.clone(), other.to_string()),
            }
        }
        Ok(row)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder form of [`RawRow::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    /// The cell exactly as stored, null tokens included
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The trimmed cell, or `None` when the key is missing or holds a null token
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw(key)
            .filter(|v| !is_null_token(v))
            .map(str::trim)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every cell whose key is not in `mapped`, verbatim
    pub fn unmapped(&self, mapped: &[&str]) -> Details {
        self.fields
            .iter()
            .filter(|(k, _)| !mapped.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    /// Seed a row from offer details. String values are written as-is,
    /// anything else in its JSON text form.
    pub fn from_details(details: &Details) -> Self {
        let mut row = Self::new();
        for (key, value) in details {
            match value {
                Value::Null => {}
                Value::String(s) => row.insert(key.clone(), s.clone()),
                other => row.insert(key.clone(), other.to_string()),
            }
        }
        row
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
