//! Shared helpers for reading Move object fields out of fullnode JSON.
//!
//! Move structs are rendered as `{"type": .., "fields": {..}}`, and `u64`
//! and wider integers as decimal strings. Protocol crates walk these shapes
//! through the functions below instead of indexing `serde_json::Value` by hand.

use bucket_core::{ProtocolError, RpcError};
use serde_json::Value;

// =============================================================================
// Field extractors
// =============================================================================

/// Follow a path of keys, stepping through `fields` wrappers transparently.
///
/// `field_at(v, &["bottle_table", "table", "size"])` reads
/// `v.bottle_table.fields.table.fields.size`.
pub fn field_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = match current.get(*key) {
            Some(next) => next,
            None => current.get("fields")?.get(*key)?,
        };
    }
    Some(current)
}

/// Read a field as a string; numbers are rendered in decimal.
pub fn field_string(value: &Value, path: &[&str]) -> Option<String> {
    match field_at(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a `u64` stored either as a JSON number or a decimal string.
pub fn field_u64(value: &Value, path: &[&str]) -> Option<u64> {
    match field_at(value, path)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Like [`field_string`] but falls back to `default` when missing or empty.
pub fn field_string_or(value: &Value, path: &[&str], default: &str) -> String {
    field_string(value, path)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// =============================================================================
// RPC error mapping
// =============================================================================

/// Map an `RpcError` from a named call to a `ProtocolError`.
///
/// - `ObjectNotFound` → `StateUnavailable` naming the object
/// - `ParseError` → `ObjectParseError`
/// - everything else → `UpstreamFailed` carrying the call name
pub fn map_rpc_error(err: RpcError, call: &str) -> ProtocolError {
    match err {
        RpcError::ObjectNotFound { object_id } => ProtocolError::StateUnavailable {
            reason: format!("{}: object {} not found", call, object_id),
        },
        RpcError::ParseError(message) => ProtocolError::ObjectParseError {
            message: format!("{}: {}", call, message),
        },
        other => ProtocolError::upstream(call, other),
    }
}
