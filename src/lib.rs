//! # irprotokit: IR/RF remote protocol parameters and ESPHome code generation
//!
//! A static catalog of the infrared/RF protocols ESPHome's `remote_transmitter` can
//! send, with the parameter schema of each, plus everything needed to go from user
//! input to a ready-to-paste configuration:
//!
//! - **Registry** ([`registry`]): protocol identifiers (case-insensitive) and their
//!   parameter schemas.
//! - **Coercion** ([`coerce`]): form text (`"0x1234"`, `"[0xA1, 0xB2]"`, `"true"`) to
//!   typed [`Value`]s, using the PEST literal grammar in [`parser`].
//! - **Validation** ([`validate`]): schema checks with per-field errors; [`form`] wraps
//!   it for interactive forms.
//! - **Formatting** ([`format`]): one `transmit_<protocol>` block per code.
//! - **Export** ([`export`]): ESPHome YAML (flat or sub-device) and JSON documents.
//!
//! ## Example
//!
//! ```
//! use irprotokit::{coerce_text, format_code_block, validate, ParamMap};
//!
//! let mut params = ParamMap::new();
//! params.insert("address".into(), coerce_text("0x1234").unwrap());
//! params.insert("command".into(), coerce_text("0x5678").unwrap());
//! let action = validate("NEC", &params).unwrap();
//! let block = format_code_block(action.protocol, &action.params);
//! assert!(block.contains("address: 4660"));
//! ```
//!
//! Everything is synchronous and side-effect free apart from `tracing` events; the
//! catalog is immutable static data and may be shared across threads.

pub mod coerce;
pub mod config;
pub mod export;
pub mod form;
pub mod format;
pub mod parser;
pub mod registry;
pub mod validate;
pub mod value;

pub use coerce::{coerce, coerce_params, coerce_text, RawValue};
pub use config::{ConfigError, ExportConfig};
pub use export::{
    build_export_document, export_file_name, DeviceMeta, ExportError, ExportFormat, Exporter, RemoteCode,
};
pub use form::{validate_code, validate_parameter, CodeValidation, FormCode};
pub use format::format_code_block;
pub use registry::{lookup, ArrayLen, FieldKind, ParameterField, ParameterSchema, Pattern, ProtocolId};
pub use validate::{
    validate, validate_coerced, FieldError, FieldErrorKind, FieldErrors, TransmitAction, TransmitRequest,
    ValidationError,
};
pub use value::{ParamMap, Value};
