// Tolerant accessors for scenario fields.
// Model output drifts between strings, lists and objects for the same field;
// every function here is total and degrades to an empty value instead of failing.

use serde_json::Value;

/// Text form of any JSON value. Strings are returned verbatim (no quotes),
/// null becomes empty, containers are rendered as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Coerce a field expected to hold a list of strings.
pub fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        Value::String(s) => {
            let lines: Vec<String> = s
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if lines.is_empty() {
                vec![s.clone()]
            } else {
                lines
            }
        }
        other => vec![value_to_text(other)],
    }
}

/// Read `key` from a record as text; missing keys and non-object records give "".
pub fn as_text(record: &Value, key: &str) -> String {
    record.get(key).map(value_to_text).unwrap_or_default()
}

/// First present key wins. Used for fields the model spells several ways.
pub fn first_present<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| record.get(*k))
}

/// Falsy in the loose sense: null, "", false, 0, [] or {}.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
