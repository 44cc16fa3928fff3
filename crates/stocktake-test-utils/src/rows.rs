//! Row builders

use serde_json::Value;
use stocktake_core::{FieldMap, StoredRow};

/// Turn a JSON object literal into a field map.
///
/// Panics if `value` is not an object.
pub fn fields(value: Value) -> FieldMap {
    match value {
        Value::Object(map) => map,
        other => panic!("fields: expected a JSON object, got {}", other),
    }
}

/// A stored row with the given id and JSON object columns.
///
/// ```
/// use serde_json::json;
/// use stocktake_test_utils::row;
///
/// let r = row("rec1", json!({"Name": "web-1", "Type": "droplet"}));
/// assert_eq!(r.name(), Some("web-1"));
/// ```
pub fn row(id: &str, value: Value) -> StoredRow {
    StoredRow::new(id, fields(value))
}
