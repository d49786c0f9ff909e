//! Endpoint template interpolation
//!
//! Stream endpoints are written with named placeholders, e.g.
//! `commerce.salesorderline-{sales_order_line}`. Each placeholder is filled
//! from the configuration's endpoint variables.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}").unwrap());

/// Render a template, failing on the first placeholder without a value
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = &caps[1];
        let value = vars.get(name).ok_or_else(|| Error::undefined_var(name))?;

        result.push_str(&template[last..whole.start()]);
        result.push_str(value);
        last = whole.end();
    }

    result.push_str(&template[last..]);
    Ok(result)
}

/// Names of all placeholders in a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check if a string contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}
