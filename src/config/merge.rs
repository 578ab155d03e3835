//! Deep merge of nested settings maps.
//!
//! Tables are merged key by key; every other value replaces what was there.
//! Arrays are replaced entirely, not concatenated.

use super::types::{NestedMap, Value};

/// Merge `src` into `dest`, returning `dest`.
///
/// - Table values are merged recursively. A missing or non-table entry in
///   `dest` is treated as an empty table.
/// - Any other value overwrites `dest[key]` (last write wins).
///
/// # Example
/// ```
/// use serde_json::json;
/// use climatecontrol::config::merge_nested;
///
/// let mut dest = json!({"server": {"port": "8080", "host": "localhost"}})
///     .as_object().cloned().unwrap();
/// let src = json!({"server": {"port": "9000"}}).as_object().cloned().unwrap();
/// merge_nested(&mut dest, src);
/// assert_eq!(dest["server"], json!({"port": "9000", "host": "localhost"}));
/// ```
pub fn merge_nested(dest: &mut NestedMap, src: NestedMap) -> &mut NestedMap {
    for (key, value) in src {
        match value {
            Value::Object(src_table) => {
                let mut dest_table = match dest.remove(&key) {
                    Some(Value::Object(existing)) => existing,
                    _ => NestedMap::new(),
                };
                merge_nested(&mut dest_table, src_table);
                dest.insert(key, Value::Object(dest_table));
            }
            leaf => {
                dest.insert(key, leaf);
            }
        }
    }
    dest
}

/// Merge several maps in order, with later maps taking precedence.
pub fn deep_merge_all(maps: impl IntoIterator<Item = NestedMap>) -> NestedMap {
    maps.into_iter().fold(NestedMap::new(), |mut acc, map| {
        merge_nested(&mut acc, map);
        acc
    })
}
