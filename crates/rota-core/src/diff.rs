//! Field-level diff between two audit snapshots.
//!
//! Computed on demand when history is read, never stored — old entries stay
//! valid if the algorithm changes. Comparison is deep structural equality on
//! JSON values. Keys absent from `after` are not reported as removed, so
//! callers must pass a fully-merged post-state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One changed field between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

/// Compare every key present in `after` against `before` and return the
/// fields whose values differ, ordered by field name.
///
/// Non-object snapshots are compared as a single `"value"` field so a
/// malformed entry still yields a usable diff rather than an error.
#[must_use]
pub fn diff(before: &serde_json::Value, after: &serde_json::Value) -> Vec<FieldChange> {
    let (Some(before_map), Some(after_map)) = (before.as_object(), after.as_object()) else {
        if before == after {
            return Vec::new();
        }
        return vec![FieldChange {
            field: "value".to_string(),
            old_value: before.clone(),
            new_value: after.clone(),
        }];
    };

    let mut changes: Vec<FieldChange> = after_map
        .iter()
        .filter(|(key, new_value)| before_map.get(*key) != Some(new_value))
        .map(|(key, new_value)| FieldChange {
            field: key.clone(),
            old_value: before_map
                .get(key)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            new_value: new_value.clone(),
        })
        .collect();
    changes.sort_by(|a, b| a.field.cmp(&b.field));
    changes
}
