//! Interactive form validation: coerce text inputs, then validate.
//!
//! Unlike the API path this never rejects a submission wholesale; it produces
//! per-field messages so the rest of the form stays usable.

use crate::coerce::{coerce_params, RawValue};
use crate::validate::{validate_coerced, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key used for errors that do not belong to a single parameter.
pub const GENERAL_KEY: &str = "_general";

/// A code as edited in the submission form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormCode {
    pub name: String,
    pub protocol: String,
    #[serde(default)]
    pub parameters: IndexMap<String, RawValue>,
}

/// Outcome of validating one form code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeValidation {
    pub name: Option<String>,
    pub parameters: IndexMap<String, String>,
    valid: bool,
}

impl CodeValidation {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validate a whole form code: its name and every parameter.
pub fn validate_code(code: &FormCode) -> CodeValidation {
    let mut result = CodeValidation {
        valid: true,
        ..Default::default()
    };

    if code.name.trim().is_empty() {
        result.name = Some("function name is required".to_string());
        result.valid = false;
    }

    // No protocol chosen yet: invalid, but there is nothing to point at.
    if code.protocol.trim().is_empty() {
        result.valid = false;
        return result;
    }

    let params = coerce_params(&code.parameters);
    match validate_coerced(&code.protocol, &params) {
        Ok(_) => {}
        Err(ValidationError::Fields(errors)) => {
            result.parameters = errors.to_messages();
            result.valid = false;
        }
        Err(e @ (ValidationError::UnknownProtocol(_) | ValidationError::BlankName)) => {
            result.parameters.insert(GENERAL_KEY.to_string(), e.to_string());
            result.valid = false;
        }
    }
    result
}

/// Validate one parameter while the user types. `value` replaces the entry for
/// `name` in `all`; only the error for `name` is returned.
pub fn validate_parameter(
    protocol: &str,
    name: &str,
    value: RawValue,
    all: &IndexMap<String, RawValue>,
) -> Option<String> {
    if protocol.trim().is_empty() {
        return None;
    }
    let mut merged = all.clone();
    merged.insert(name.to_string(), value);
    let params = coerce_params(&merged);
    match validate_coerced(protocol, &params) {
        Err(ValidationError::Fields(errors)) => errors.get(name).map(|kind| kind.to_string()),
        _ => None,
    }
}
