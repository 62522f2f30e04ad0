//! Validate protocol parameters against the catalog.
//!
//! One validation routine serves both entry points: the API path (`validate`, result
//! restricted to declared fields) and the form path (`validate_coerced`, result keeps
//! every coerced key). Both report exactly the same field errors for the same input.

use crate::registry::{lookup, ArrayLen, FieldKind, ParameterField, ProtocolId};
use crate::value::{ParamMap, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type a field expected when the supplied value had the wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Integer,
    Boolean,
    Array,
    String,
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpectedType::Integer => "an integer",
            ExpectedType::Boolean => "true or false",
            ExpectedType::Array => "an array (e.g. [0xA1, 0x82])",
            ExpectedType::String => "a string",
        })
    }
}

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    #[error("required")]
    Required,
    #[error("wrong type: expected {expected}, got {found}")]
    WrongType { expected: ExpectedType, found: &'static str },
    #[error("out of range: below minimum of {min}")]
    BelowMinimum { min: i64 },
    #[error("out of range: above maximum of {max}")]
    AboveMaximum { max: i64 },
    #[error("wrong length: expected {expected} elements, got {actual}")]
    WrongLength { expected: ArrayLen, actual: usize },
    #[error("wrong type: element {index} must be an integer")]
    ElementWrongType { index: usize },
    #[error("out of range: element {index} must be between {min} and {max}")]
    ElementOutOfRange { index: usize, min: i64, max: i64 },
    #[error("invalid format: must match {pattern}")]
    PatternMismatch { pattern: &'static str },
}

impl FieldErrorKind {
    pub fn is_type_error(&self) -> bool {
        matches!(self, FieldErrorKind::WrongType { .. } | FieldErrorKind::ElementWrongType { .. })
    }

    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            FieldErrorKind::BelowMinimum { .. }
                | FieldErrorKind::AboveMaximum { .. }
                | FieldErrorKind::ElementOutOfRange { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

/// Field errors in schema declaration order, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&FieldErrorKind> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{field: message}` pairs for inline form errors.
    pub fn to_messages(&self) -> indexmap::IndexMap<String, String> {
        self.0
            .iter()
            .map(|e| (e.field.to_string(), e.kind.to_string()))
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", e.field, e.kind)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Protocol id not in the catalog; not scoped to a field.
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
    #[error("invalid parameters: {0}")]
    Fields(FieldErrors),
    /// A code was given a blank display name.
    #[error("function name is required")]
    BlankName,
}

impl ValidationError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationError::Fields(errors) => Some(errors),
            ValidationError::UnknownProtocol(_) | ValidationError::BlankName => None,
        }
    }
}

/// Which keys the validated mapping keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retain {
    /// Only fields declared by the schema, in declaration order.
    Declared,
    /// Every supplied key, in the caller's order.
    All,
}

/// A validated transmit action: canonical protocol plus typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmitAction {
    pub protocol: ProtocolId,
    pub params: ParamMap,
}

/// Untyped API payload `{ "protocol": ..., "params": {...} }`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransmitRequest {
    pub protocol: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl TransmitAction {
    /// Validate an API payload. Any failure rejects the whole request.
    pub fn from_request(request: TransmitRequest) -> Result<Self, ValidationError> {
        let params: ParamMap = request
            .params
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();
        validate(&request.protocol, &params)
    }
}

impl TryFrom<TransmitRequest> for TransmitAction {
    type Error = ValidationError;

    fn try_from(request: TransmitRequest) -> Result<Self, Self::Error> {
        TransmitAction::from_request(request)
    }
}

/// API path: validate typed parameters, keep only declared fields.
pub fn validate(protocol: &str, params: &ParamMap) -> Result<TransmitAction, ValidationError> {
    validate_with(protocol, params, Retain::Declared)
}

/// Form path: validate coerced parameters, keep the whole mapping.
pub fn validate_coerced(protocol: &str, params: &ParamMap) -> Result<TransmitAction, ValidationError> {
    validate_with(protocol, params, Retain::All)
}

pub fn validate_with(
    protocol: &str,
    params: &ParamMap,
    retain: Retain,
) -> Result<TransmitAction, ValidationError> {
    let schema = lookup(protocol).ok_or_else(|| ValidationError::UnknownProtocol(protocol.to_string()))?;

    let mut errors = Vec::new();
    let mut checked = ParamMap::new();
    for field in schema.fields {
        match params.get(field.name) {
            None if field.required => errors.push(FieldError {
                field: field.name,
                kind: FieldErrorKind::Required,
            }),
            None => {}
            Some(value) => match check_field(field, value) {
                Ok(v) => {
                    checked.insert(field.name.to_string(), v);
                }
                Err(kind) => errors.push(FieldError { field: field.name, kind }),
            },
        }
    }

    if !errors.is_empty() {
        tracing::debug!(protocol = %schema.protocol, errors = errors.len(), "parameters rejected");
        return Err(ValidationError::Fields(FieldErrors(errors)));
    }

    let params = match retain {
        Retain::Declared => checked,
        Retain::All => {
            let mut all = params.clone();
            for (k, v) in checked {
                all.insert(k, v);
            }
            all
        }
    };
    tracing::trace!(protocol = %schema.protocol, fields = params.len(), "parameters accepted");
    Ok(TransmitAction {
        protocol: schema.protocol,
        params,
    })
}

/// Check one present value; returns the normalized value.
pub fn check_field(field: &ParameterField, value: &Value) -> Result<Value, FieldErrorKind> {
    match field.kind {
        FieldKind::Integer { min, max } => {
            let n = integral(value).ok_or(FieldErrorKind::WrongType {
                expected: ExpectedType::Integer,
                found: value.type_name(),
            })?;
            let upper = max.unwrap_or(i64::MAX);
            if n < i128::from(min) {
                Err(FieldErrorKind::BelowMinimum { min })
            } else if n > i128::from(upper) {
                Err(FieldErrorKind::AboveMaximum { max: upper })
            } else {
                Ok(Value::Int(n as i64))
            }
        }
        FieldKind::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(FieldErrorKind::WrongType {
                expected: ExpectedType::Boolean,
                found: other.type_name(),
            }),
        },
        FieldKind::ByteArray { len } => {
            let items = list(value)?;
            if !len.contains(items.len()) {
                return Err(FieldErrorKind::WrongLength {
                    expected: len,
                    actual: items.len(),
                });
            }
            check_elements(items, Some((0, 0xFF)))
        }
        FieldKind::IntArray => check_elements(list(value)?, None),
        FieldKind::Pattern(pattern) => match value {
            Value::Str(s) if pattern.matches(s) => Ok(value.clone()),
            Value::Str(_) => Err(FieldErrorKind::PatternMismatch {
                pattern: pattern.as_str(),
            }),
            other => Err(FieldErrorKind::WrongType {
                expected: ExpectedType::String,
                found: other.type_name(),
            }),
        },
    }
}

fn list(value: &Value) -> Result<&[Value], FieldErrorKind> {
    value.as_list().ok_or(FieldErrorKind::WrongType {
        expected: ExpectedType::Array,
        found: value.type_name(),
    })
}

fn check_elements(items: &[Value], bounds: Option<(i64, i64)>) -> Result<Value, FieldErrorKind> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let n = integral(item)
            .and_then(|n| i64::try_from(n).ok())
            .ok_or(FieldErrorKind::ElementWrongType { index })?;
        if let Some((min, max)) = bounds {
            if n < min || n > max {
                return Err(FieldErrorKind::ElementOutOfRange { index, min, max });
            }
        }
        out.push(Value::Int(n));
    }
    Ok(Value::List(out))
}

/// Integer view wide enough to range-check integral floats beyond i64.
fn integral(value: &Value) -> Option<i128> {
    match value {
        Value::Int(x) => Some(i128::from(*x)),
        Value::Float(x) if x.is_finite() && x.fract() == 0.0 => Some(*x as i128),
        _ => None,
    }
}
