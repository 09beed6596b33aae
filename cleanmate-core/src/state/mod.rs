//! Last-known device state, updated from decoded responses.
//!
//! Updates are sparse: a key missing from a response leaves the stored
//! field alone, and a malformed field is logged and skipped without
//! affecting the other fields of the same update.

mod device;
mod map;

pub use device::DeviceState;
pub use map::{MapState, Position, Room};

use serde_json::Value;

/// Integer view of a coerced value. Integral floats count.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    }
}

/// Text view of a scalar. Coercion turns numeric-looking strings into
/// numbers, so those are rendered back.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        other => as_int(other).map(|n| n != 0),
    }
}
