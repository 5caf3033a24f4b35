//! Cache key derivation.
//!
//! Keys are plain strings of the form
//! `{prefix}.{method}.{path1}={value1}.{path2}={value2}…` where each
//! `(path, value)` pair is a leaf of the flattened argument list. The first
//! path segment is the argument's position; nested sequences add their index
//! and nested mappings add their key, in the mapping's iteration order.
//!
//! # Injectivity
//!
//! Two argument lists produce the same key only if they are structurally
//! equal. The rendering rules that guarantee this:
//!
//! - scalar leaves are rendered as compact JSON, so strings are quoted and
//!   escaped (`"3"` is not `3`, and a `.` or `=` inside a string stays inside
//!   its quotes);
//! - mapping keys are rendered bare only when they look like identifiers
//!   (`[A-Za-z_][A-Za-z0-9_-]*`), otherwise JSON-quoted, so the key `"0"`
//!   never collides with sequence index `0` and `"a.b"` never collides with a
//!   nested `a` → `b`;
//! - empty sequences and mappings are kept as `[]` / `{}` leaves instead of
//!   disappearing from the key.
//!
//! ```rust
//! use repocache::key::derive;
//! use serde_json::json;
//!
//! assert_eq!(derive("users", "find", &[json!(3)]), "users.find.0=3");
//! assert_eq!(derive("users", "all", &[]), "users.all");
//! ```

use serde_json::Value;

/// Separator between key segments.
pub const SEPARATOR: char = '.';

/// Derive the cache key for one call.
///
/// Pure: the same `(prefix, method, args)` always yields the same string.
pub fn derive(prefix: &str, method: &str, args: &[Value]) -> String {
    let mut key = format!("{prefix}{SEPARATOR}{method}");
    for (path, value) in flatten(args) {
        key.push(SEPARATOR);
        key.push_str(&path);
        key.push('=');
        key.push_str(&value);
    }
    key
}

/// Flatten an argument list into ordered `(path, rendered value)` leaves.
pub fn flatten(args: &[Value]) -> Vec<(String, String)> {
    let mut leaves = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        flatten_into(index.to_string(), arg, &mut leaves);
    }
    leaves
}

fn flatten_into(path: String, value: &Value, leaves: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{path}{SEPARATOR}{index}"), item, leaves);
            }
        }
        Value::Object(map) if !map.is_empty() => {
            for (name, item) in map {
                flatten_into(
                    format!("{path}{SEPARATOR}{}", render_segment(name)),
                    item,
                    leaves,
                );
            }
        }
        Value::Array(_) => leaves.push((path, "[]".to_string())),
        Value::Object(_) => leaves.push((path, "{}".to_string())),
        scalar => leaves.push((path, scalar.to_string())),
    }
}

fn render_segment(name: &str) -> String {
    if is_bare_segment(name) {
        name.to_string()
    } else {
        Value::String(name.to_string()).to_string()
    }
}

fn is_bare_segment(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Key derivation bound to one key prefix.
///
/// A proxy owns one of these; the prefix namespaces every key it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenerator {
    prefix: String,
}

impl KeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive the key for `method` called with `args`.
    pub fn derive(&self, method: &str, args: &[Value]) -> String {
        derive(&self.prefix, method, args)
    }
}
