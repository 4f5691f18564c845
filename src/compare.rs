//! Structural deep-equality comparison and the `expect` assertion helpers.
//!
//! `equals` is the comparator test bodies assert with; the engine itself
//! never calls it. Comparison is classification-first: operands of different
//! kinds are never equal, and each kind carries its own equality rule.

use std::sync::Arc;

use im::HashMap;

use crate::errors::HarnessError;
use crate::value::Value;

/// Returns true if `expected` is structurally equal to `actual`.
///
/// Map comparison uses the union of both sides' keys and ignores every member
/// whose name begins with `_`, so two maps that differ only in `_`-prefixed
/// entries are considered equal. A key present on one side reads as
/// `Undefined` on the other, which never compares equal, so one-sided keys
/// fail the comparison from either direction.
///
/// `Undefined` has no equality rule and falls through to false, even against
/// itself. Values are owned trees, so there are no cycles to guard against.
///
/// # Examples
///
/// ```rust
/// use attest::{equals, Value};
/// assert!(equals(&Value::from(1.0), &Value::from(1.0)));
/// assert!(!equals(&Value::from(1.0), &Value::from("1")));
/// ```
pub fn equals(expected: &Value, actual: &Value) -> bool {
    if expected.kind() != actual.kind() {
        return false;
    }
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a.to_rfc3339() == b.to_rfc3339(),
        (Value::Regexp(a), Value::Regexp(b)) => a.as_str() == b.as_str(),
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equals(x, y))
        }
        (Value::Map(a), Value::Map(b)) => maps_equal(a, b),
        _ => false,
    }
}

fn maps_equal(expected: &HashMap<String, Value>, actual: &HashMap<String, Value>) -> bool {
    for (member, value) in actual.iter() {
        if member.starts_with('_') {
            continue;
        }
        if !equals(expected.get(member).unwrap_or(&Value::Undefined), value) {
            return false;
        }
    }
    for (member, value) in expected.iter() {
        if member.starts_with('_') {
            continue;
        }
        if !equals(value, actual.get(member).unwrap_or(&Value::Undefined)) {
            return false;
        }
    }
    true
}

/// Fails with an assertion error unless `equals(expected, actual)` holds.
///
/// The error message embeds both rendered values; use [`expect_with`] to
/// supply your own.
pub fn expect(expected: &Value, actual: &Value) -> Result<(), HarnessError> {
    check(expected, actual, None)
}

/// Like [`expect`], but the assertion error carries `message` instead of the
/// default rendering.
pub fn expect_with(expected: &Value, actual: &Value, message: &str) -> Result<(), HarnessError> {
    check(expected, actual, Some(message))
}

fn check(expected: &Value, actual: &Value, message: Option<&str>) -> Result<(), HarnessError> {
    if equals(expected, actual) {
        return Ok(());
    }
    let rendered_expected = expected.to_string();
    let rendered_actual = actual.to_string();
    let message = match message {
        Some(text) => text.to_string(),
        None => format!("Expected '{rendered_expected}', received '{rendered_actual}'"),
    };
    Err(HarnessError::Assertion {
        message,
        expected: rendered_expected,
        actual: rendered_actual,
    })
}
