//! Safe navigation over the remote forecast JSON.
//!
//! The endpoint's shape is an external contract that may drop or null any
//! field. Every accessor here yields `None` instead of failing; JSON `null`
//! is treated the same as a missing key.

use serde_json::Value;

/// One step of a path into a JSON document.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

/// Object member lookup. `null` members are absent.
pub fn field<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value.as_object()?.get(key).filter(|v| !v.is_null())
}

/// Array element lookup. `null` elements are absent.
pub fn index(value: &Value, i: usize) -> Option<&Value> {
    value.as_array()?.get(i).filter(|v| !v.is_null())
}

/// Follow a sequence of steps, stopping at the first missing level.
pub fn path<'v>(value: &'v Value, steps: &[Step<'_>]) -> Option<&'v Value> {
    steps.iter().try_fold(value, |current, step| match step {
        Step::Key(key) => field(current, key),
        Step::Index(i) => index(current, *i),
    })
}

/// Per-day records: `items[0].forecasts`, or an empty slice.
pub fn day_records(data: &Value) -> &[Value] {
    path(
        data,
        &[Step::Key("items"), Step::Index(0), Step::Key("forecasts")],
    )
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

/// Non-empty string at `value`.
pub fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Numeric value at `value`; numeric strings are accepted.
pub fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Scalar rendered as display text: non-empty strings verbatim, numbers
/// without a trailing `.0`. Anything else is absent.
pub fn display(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
