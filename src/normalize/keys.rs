//! Key rewriting
//!
//! Converts camelCase / PascalCase keys to snake_case, strips `$` sigils and
//! turns `/` into `_`. A key that would come out as `items` is renamed to
//! `list_items` so it cannot collide with the reserved word downstream.

use crate::types::{JsonObject, JsonValue};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Reserved key and its replacement
const RESERVED_ITEMS: &str = "items";
const RENAMED_ITEMS: &str = "list_items";

/// Any character followed by a capitalised word: `lastModified` -> `last_Modified`
static CAPITALISED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

/// Lowercase letter or digit followed by an uppercase letter: `skuID` -> `sku_ID`
static LOWER_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Rewrite a single key
pub fn convert_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .filter(|c| *c != '$')
        .map(|c| if c == '/' { '_' } else { c })
        .collect();

    let split_words = CAPITALISED_WORD.replace_all(&cleaned, "${1}_${2}");
    let snake = LOWER_UPPER
        .replace_all(&split_words, "${1}_${2}")
        .to_lowercase();

    if snake == RESERVED_ITEMS {
        RENAMED_ITEMS.to_string()
    } else {
        snake
    }
}

/// Rewrite every key of every mapping, descending into mappings and lists
///
/// When two keys of one mapping rewrite to the same key, a key that was
/// already in rewritten form keeps its value (`last_modified` beats
/// `lastModified`). Between two rewritten keys the later one in key order wins.
pub fn rewrite_keys(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let (unchanged, renamed): (Vec<_>, Vec<_>) =
                map.into_iter().partition(|(key, _)| convert_key(key) == *key);

            let mut out = JsonObject::new();
            for (key, child) in renamed.into_iter().chain(unchanged) {
                let converted = convert_key(&key);
                if out.contains_key(&converted) {
                    debug!(key = %key, into = %converted, "Key collides after rewrite");
                }
                out.insert(converted, rewrite_keys(child));
            }
            JsonValue::Object(out)
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(rewrite_keys).collect()),
        other => other,
    }
}
