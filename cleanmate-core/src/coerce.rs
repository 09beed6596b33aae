//! Normalisation of loosely-typed device payloads.
//!
//! The vacuum encodes most values as strings: numbers as `"80"`, lists as
//! `"1;2;3"` or `"12,40"`, and whole objects as JSON nested inside a
//! string. [`coerce`] turns such a payload into plain JSON values so the
//! state model can read fields by type.
//!
//! Rules for a string node, first match wins:
//!
//! 1. valid JSON → the parsed value, coerced again
//! 2. contains `;` → sequence of the coerced `;`-separated parts
//! 3. contains `,` → sequence of the coerced `,`-separated parts
//! 4. `\d+(\.\d+)?` → integer of the digits with the dot removed
//! 5. anything else → unchanged
//!
//! Rule 4 only sees strings that are not valid JSON numbers, such as
//! `"007"` or `"01.5"`. `"01.5"` becomes `15`, not `1` or `2`.

use serde_json::Value;

/// Recursively normalise a decoded response value.
///
/// Never fails; anything it does not recognise is returned as-is.
pub fn coerce(value: Value) -> Value {
    match value {
        Value::String(text) => coerce_str(text),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, coerce(v))).collect()),
        other => other,
    }
}

/// Coerce raw response text, as read from a frame body.
pub fn coerce_text(text: &str) -> Value {
    coerce_str(text.to_owned())
}

fn coerce_str(text: String) -> Value {
    if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
        return coerce(parsed);
    }
    if text.contains(';') {
        return split_coerced(&text, ';');
    }
    if text.contains(',') {
        return split_coerced(&text, ',');
    }
    match digits_as_integer(&text) {
        Some(n) => Value::from(n),
        None => Value::String(text),
    }
}

fn split_coerced(text: &str, delimiter: char) -> Value {
    Value::Array(
        text.split(delimiter)
            .map(|part| coerce_str(part.to_owned()))
            .collect(),
    )
}

/// `^\d+(\.\d+)?$` with the dot dropped. `None` when the pattern does
/// not match or the digits overflow `u64`.
fn digits_as_integer(text: &str) -> Option<u64> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let joined = match text.split_once('.') {
        Some((whole, frac)) if all_digits(whole) && all_digits(frac) => {
            let mut joined = String::with_capacity(text.len() - 1);
            joined.push_str(whole);
            joined.push_str(frac);
            joined
        }
        None if all_digits(text) => text.to_owned(),
        _ => return None,
    };
    joined.parse().ok()
}
