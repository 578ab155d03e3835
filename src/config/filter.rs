//! Subtree selection over nested settings.
//!
//! A [`FilterSpec`] mirrors the shape of the result it selects:
//!
//! - `All` (also written `*`, `null` or an empty value) keeps everything.
//! - `Key("db")` selects the `db` section.
//! - `Keyed([("db", spec)])` selects `db` and filters inside it by `spec`,
//!   keeping the result under `db`.
//! - `Many([a, b])` applies `a` and `b` to the same input and merges both.
//!
//! Missing sections are not errors: they are reported through the
//! [`LogSink`] and select nothing.

use super::merge::merge_nested;
use super::types::{NestedMap, Value};
use crate::error::{Result, SettingsError};
use crate::logging::LogSink;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

/// Marker that means "no filtering".
pub const WILDCARD: &str = "*";

/// Declarative selector for subtrees of a [`NestedMap`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum FilterSpec {
    /// Pass the data through unchanged.
    #[default]
    All,
    /// Select a single top-level key.
    Key(String),
    /// Select each key, then apply the paired filter inside it.
    Keyed(Vec<(String, FilterSpec)>),
    /// Apply each filter to the same input and merge the results.
    Many(Vec<FilterSpec>),
}

impl FilterSpec {
    pub fn key(key: impl Into<String>) -> Self {
        Self::from(key.into())
    }

    pub fn keyed<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, FilterSpec)>,
        K: Into<String>,
    {
        Self::Keyed(pairs.into_iter().map(|(k, spec)| (k.into(), spec)).collect())
    }

    pub fn many<I, F>(specs: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FilterSpec>,
    {
        Self::Many(specs.into_iter().map(Into::into).collect())
    }

    /// True when the spec selects everything. Empty collections count too.
    pub fn is_all(&self) -> bool {
        match self {
            FilterSpec::All => true,
            FilterSpec::Key(key) => key.is_empty() || key == WILDCARD,
            FilterSpec::Keyed(pairs) => pairs.is_empty(),
            FilterSpec::Many(specs) => specs.is_empty(),
        }
    }

    /// JSON form of the spec, as accepted by `TryFrom<Value>`.
    pub fn to_value(&self) -> Value {
        match self {
            FilterSpec::All => Value::Null,
            FilterSpec::Key(key) => Value::String(key.clone()),
            FilterSpec::Keyed(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(key, spec)| (key.clone(), spec.to_value()))
                    .collect(),
            ),
            FilterSpec::Many(specs) => Value::Array(specs.iter().map(FilterSpec::to_value).collect()),
        }
    }
}

impl From<&str> for FilterSpec {
    fn from(key: &str) -> Self {
        Self::from(key.to_string())
    }
}

impl From<String> for FilterSpec {
    fn from(key: String) -> Self {
        if key.is_empty() || key == WILDCARD {
            FilterSpec::All
        } else {
            FilterSpec::Key(key)
        }
    }
}

impl<T: Into<FilterSpec>> From<Option<T>> for FilterSpec {
    fn from(spec: Option<T>) -> Self {
        spec.map(Into::into).unwrap_or_default()
    }
}

impl TryFrom<Value> for FilterSpec {
    type Error = SettingsError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(FilterSpec::All),
            Value::String(key) => Ok(FilterSpec::from(key)),
            Value::Object(map) if map.is_empty() => Ok(FilterSpec::All),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, sub)| Ok((key, FilterSpec::try_from(sub)?)))
                .collect::<Result<Vec<_>>>()
                .map(FilterSpec::Keyed),
            Value::Array(items) if items.is_empty() => Ok(FilterSpec::All),
            Value::Array(items) => items
                .into_iter()
                .map(FilterSpec::try_from)
                .collect::<Result<Vec<_>>>()
                .map(FilterSpec::Many),
            Value::Bool(b) => Err(SettingsError::unsupported_filter(format!("boolean {}", b))),
            Value::Number(n) => Err(SettingsError::unsupported_filter(format!("number {}", n))),
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Parses either JSON (`{"db": "host"}`, `["a", "b"]`, `null`) or a bare key.
impl FromStr for FilterSpec {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed == "null" {
            let value: Value = serde_json::from_str(trimmed)
                .map_err(|e| SettingsError::unsupported_filter(format!("{}: {}", trimmed, e)))?;
            FilterSpec::try_from(value)
        } else {
            Ok(FilterSpec::from(trimmed))
        }
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Select the parts of `data` described by `spec`.
///
/// `parent_path` only labels diagnostics (`Section settings.db not found`).
/// `All` borrows `data`; every other spec returns an owned copy.
pub fn subtree<'a>(
    data: &'a NestedMap,
    spec: &FilterSpec,
    parent_path: &[String],
    sink: &dyn LogSink,
) -> Cow<'a, NestedMap> {
    if spec.is_all() {
        return Cow::Borrowed(data);
    }

    match spec {
        FilterSpec::Key(key) => Cow::Owned(select(data, key, parent_path, sink)),
        FilterSpec::Keyed(pairs) => {
            let mut new_data = NestedMap::new();
            for (key, sub_spec) in pairs {
                let Some(found) = section(data, key, parent_path, sink) else {
                    continue;
                };
                let selected = match found {
                    Value::Object(table) => {
                        let path = extend(parent_path, key);
                        Value::Object(subtree(table, sub_spec, &path, sink).into_owned())
                    }
                    leaf if sub_spec.is_all() => leaf.clone(),
                    _ => {
                        sink.warning(&format!(
                            "Section {} is not a table and can not be filtered further",
                            dotted(parent_path, key)
                        ));
                        continue;
                    }
                };
                let mut entry = NestedMap::new();
                entry.insert(key.clone(), selected);
                merge_nested(&mut new_data, entry);
            }
            Cow::Owned(new_data)
        }
        FilterSpec::Many(specs) => {
            let mut new_data = NestedMap::new();
            for sub_spec in specs {
                let selected = subtree(data, sub_spec, parent_path, sink).into_owned();
                merge_nested(&mut new_data, selected);
            }
            Cow::Owned(new_data)
        }
        FilterSpec::All => Cow::Borrowed(data),
    }
}

/// Single-key selection. A table yields a copy of its contents; a leaf has no
/// contents of its own, so it is kept under its key.
fn select(data: &NestedMap, key: &str, parent_path: &[String], sink: &dyn LogSink) -> NestedMap {
    match section(data, key, parent_path, sink) {
        Some(Value::Object(table)) => table.clone(),
        Some(leaf) => {
            let mut map = NestedMap::new();
            map.insert(key.to_string(), leaf.clone());
            map
        }
        None => NestedMap::new(),
    }
}

fn section<'a>(
    data: &'a NestedMap,
    key: &str,
    parent_path: &[String],
    sink: &dyn LogSink,
) -> Option<&'a Value> {
    let found = data.get(key);
    if found.is_none() {
        sink.warning(&format!("Section {} not found in data", dotted(parent_path, key)));
    }
    found
}

fn extend(parent_path: &[String], key: &str) -> Vec<String> {
    let mut path = parent_path.to_vec();
    path.push(key.to_string());
    path
}

fn dotted(parent_path: &[String], key: &str) -> String {
    if parent_path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent_path.join("."), key)
    }
}
