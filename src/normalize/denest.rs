//! One-level denesting
//!
//! `{"a": {"b": 1}}` becomes `{"a_b": 1}`. Only the record's own fields are
//! hoisted; lists and deeper levels are left alone.

use crate::types::{JsonObject, JsonValue};

/// Hoist nested mappings of a record (or of each record in a list) one level
pub fn denest(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(record) => JsonValue::Object(denest_record(record)),
        JsonValue::Array(records) => JsonValue::Array(records.into_iter().map(denest).collect()),
        other => other,
    }
}

fn denest_record(record: JsonObject) -> JsonObject {
    let mut out = JsonObject::new();
    let mut hoisted = Vec::new();

    for (key, value) in record {
        match value {
            JsonValue::Object(children) => {
                for (child_key, child_value) in children {
                    hoisted.push((format!("{key}_{child_key}"), child_value));
                }
            }
            other => {
                out.insert(key, other);
            }
        }
    }

    // Fields already present at the top level win over hoisted ones.
    for (key, value) in hoisted {
        out.entry(key).or_insert(value);
    }

    out
}
