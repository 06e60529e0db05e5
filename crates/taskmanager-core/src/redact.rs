//! Redaction of credentials before payloads reach the logs.

use serde::Serialize;
use serde_json::{Map, Value};

/// Replacement written over sensitive values
pub const REDACTED: &str = "***REDACTED***";

/// Key fragments that mark a field as sensitive (matched case-insensitively).
const SENSITIVE_KEYS: &[&str] = &[
    "senha",
    "password",
    "token",
    "confirmasenha",
    "senhaatual",
    "novasenha",
    "authorization",
];

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|s| key.contains(s))
}

/// Return a copy of `value` with every sensitive field replaced, recursing
/// into nested objects and arrays.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .iter()
                .map(|(k, v)| {
                    if is_sensitive(k) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), sanitize(v))
                    }
                })
                .collect();
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

/// Serialize and sanitize in one step, for `trace!` fields.
pub fn sanitized<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .map(|v| sanitize(&v))
        .unwrap_or(Value::Null)
}

/// Sanitize a raw response body; non-JSON bodies are passed through as-is.
pub fn sanitize_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => sanitize(&value).to_string(),
        Err(_) => body.to_string(),
    }
}
