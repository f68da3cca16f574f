//! Scalar-leaf flattening for full-text search.
//!
//! Search consumers index one opaque string per node, not structured JSON.
//! Flattening walks a document and concatenates the scalar leaves so search
//! sees values without structural punctuation. Booleans are skipped; flag
//! soup like `true false true` has no search value.

use serde_json::Value as Json;

/// Flatten a JSON value into its space-joined scalar leaf values.
///
/// Descends objects in value order and arrays in index order. String leaves
/// are taken verbatim, numbers and null via their JSON token form, boolean
/// leaves are dropped. No leading separator.
pub fn flatten(value: &Json) -> String {
    let mut out = String::new();
    collect(value, &mut out);
    out
}

fn collect(value: &Json, out: &mut String) {
    match value {
        Json::Object(map) => {
            for item in map.values() {
                collect(item, out);
            }
        }
        Json::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        Json::Bool(_) => {}
        Json::String(s) => push(s, out),
        Json::Number(n) => push(&n.to_string(), out),
        Json::Null => push("null", out),
    }
}

fn push(token: &str, out: &mut String) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(token);
}
