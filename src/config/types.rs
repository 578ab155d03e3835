//! Nested settings map and its read-only view.

use crate::error::{Result, SettingsError};
pub use serde_json::Value;

/// String-keyed settings tree. `Value::Object` entries are nodes, every other
/// value is a leaf.
pub type NestedMap = serde_json::Map<String, Value>;

/// Read-only, mapping-like access to a materialized settings tree.
pub trait SettingsView {
    /// The underlying map.
    fn as_map(&self) -> &NestedMap;

    fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().get(key)
    }

    /// Like [`SettingsView::get`] but reports a missing key as an error.
    fn try_get(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| SettingsError::key_not_found(key))
    }

    fn contains_key(&self, key: &str) -> bool {
        self.as_map().contains_key(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        Box::new(self.as_map().keys())
    }

    fn len(&self) -> usize {
        self.as_map().len()
    }

    fn is_empty(&self) -> bool {
        self.as_map().is_empty()
    }

    /// Walk a dotted path (`section.subsection.key`) through nested tables.
    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

impl SettingsView for NestedMap {
    fn as_map(&self) -> &NestedMap {
        self
    }
}

/// Build a single-branch map `{k1: {k2: ... {kn: leaf}}}`.
pub fn nest(keys: &[&str], leaf: Value) -> NestedMap {
    let mut map = NestedMap::new();
    match keys.split_first() {
        None => {}
        Some((last, [])) => {
            map.insert((*last).to_string(), leaf);
        }
        Some((first, rest)) => {
            map.insert((*first).to_string(), Value::Object(nest(rest, leaf)));
        }
    }
    map
}
