use chrono::{DateTime, Utc};

use crate::value::Value;

/// Placeholder written by the parser in place of a bare `new Date(N)`.
const DATE_LITERAL_PREFIX: &str = "${new Date(";
const DATE_LITERAL_SUFFIX: &str = ")}";

/// Replace every `${new Date(N)}` string in the tree with a native
/// timestamp of `N` milliseconds since the epoch. Depth-first; other
/// values are left untouched.
pub fn patch_literals(value: &mut Value) {
    if let Some(dt) = value.as_str().and_then(parse_date_literal) {
        *value = Value::DateTime(dt);
        return;
    }
    match value {
        Value::Document(doc) => doc.values_mut().for_each(patch_literals),
        Value::Map(map) => map.values_mut().for_each(patch_literals),
        Value::Array(items) => items.iter_mut().for_each(patch_literals),
        _ => {}
    }
}

/// Match `${new Date(<digits>)}` at the start of `s`.
///
/// Returns `None` when the digits overflow a representable UTC instant.
pub fn parse_date_literal(s: &str) -> Option<DateTime<Utc>> {
    let rest = s.strip_prefix(DATE_LITERAL_PREFIX)?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 || !rest[end..].starts_with(DATE_LITERAL_SUFFIX) {
        return None;
    }
    let millis: i64 = rest[..end].parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}
