//! Best-effort conversion of form input into typed parameter values.
//!
//! Form controls hand every parameter over as text (a few call sites pass numbers or
//! booleans already typed). Coercion never fails: text that is not a recognizable
//! literal stays a string and the validator reports the type problem.
//!
//! Rules, in priority order, applied to the trimmed text:
//!
//! 1. empty → the field is omitted
//! 2. `0x`/`0X` prefix → hexadecimal integer
//! 3. decimal number → integer when integral, otherwise float
//! 4. `true` / `false` → boolean
//! 5. `[a, b, ...]` → integer list (each element hex or decimal); one bad element keeps
//!    the whole text
//! 6. anything else → string

use crate::parser::parse_literal;
use crate::value::{float_to_i64, ParamMap, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw value as produced by a form control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Number(x)
    }
}

impl From<i64> for RawValue {
    fn from(x: i64) -> Self {
        RawValue::Number(x as f64)
    }
}

/// Coerce one raw value. `None` means the field is treated as absent.
pub fn coerce(raw: &RawValue) -> Option<Value> {
    match raw {
        RawValue::Bool(b) => Some(Value::Bool(*b)),
        RawValue::Number(x) => Some(match float_to_i64(*x) {
            Some(i) => Value::Int(i),
            None => Value::Float(*x),
        }),
        RawValue::Text(text) => coerce_text(text),
    }
}

/// Coerce form text; see the module docs for the rules.
pub fn coerce_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_literal(trimmed) {
        Ok(v) => Some(v),
        Err(reason) => {
            tracing::trace!(input = trimmed, %reason, "kept as string");
            Some(Value::Str(trimmed.to_string()))
        }
    }
}

/// Coerce a whole parameter mapping, dropping omitted fields and keeping key order.
pub fn coerce_params(raw: &IndexMap<String, RawValue>) -> ParamMap {
    raw.iter()
        .filter_map(|(k, v)| coerce(v).map(|v| (k.clone(), v)))
        .collect()
}
