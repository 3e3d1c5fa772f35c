//! Dotted attribute paths such as `address.geo.lat`.

use serde_json::{Map, Value};

/// Splits `name` on `separator`.
pub fn split<'a>(name: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![name];
    }
    name.split(separator).collect()
}

/// True when `name` contains no separator.
pub fn is_simple(name: &str, separator: &str) -> bool {
    separator.is_empty() || !name.contains(separator)
}

/// The first segment of `name`.
pub fn head<'a>(name: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return name;
    }
    name.split(separator).next().unwrap_or(name)
}

/// Wraps `value` in one mapping per segment, innermost last.
///
/// `nest(&["geo", "lat"], 1)` yields `{"geo": {"lat": 1}}`. No segments yields
/// the value itself.
pub fn nest(segments: &[&str], value: Value) -> Value {
    segments.iter().rev().fold(value, |inner, segment| {
        let mut outer = Map::new();
        outer.insert((*segment).to_string(), inner);
        Value::Object(outer)
    })
}
