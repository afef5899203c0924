use serde_json::{Map, Value};

/// Fields of `desired` whose value differs from the same key in `existing`.
///
/// Keys missing from `existing` count as different. Comparison is structural,
/// so object key order never matters.
pub fn changed_fields(desired: &Map<String, Value>, existing: &Value) -> Map<String, Value> {
    desired
        .iter()
        .filter(|(key, value)| existing.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
