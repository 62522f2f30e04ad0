//! Integration tests: form coercion → validation → code block → export document.

use indexmap::IndexMap;
use irprotokit::export::{sanitize_device_id, Exporter};
use irprotokit::form::{validate_code, FormCode};
use irprotokit::{
    coerce_params, coerce_text, format_code_block, validate, validate_coerced, DeviceMeta, ExportFormat,
    FieldErrorKind, ParamMap, ProtocolId, RawValue, RemoteCode, TransmitAction, TransmitRequest, ValidationError,
    Value,
};

fn params(pairs: &[(&str, Value)]) -> ParamMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn field_error<'a>(err: &'a ValidationError, field: &str) -> Option<&'a FieldErrorKind> {
    err.field_errors().and_then(|e| e.get(field))
}

#[test]
fn test_nec_validates_and_formats() {
    let p = params(&[
        ("address", Value::Int(0x1234)),
        ("command", Value::Int(0x5678)),
        ("command_repeats", Value::Int(1)),
    ]);
    let action = validate("nec", &p).expect("valid");
    let block = format_code_block(action.protocol, &action.params);
    assert!(block.contains("address: 4660"));
    assert!(block.contains("command: 22136"));
    assert!(block.contains("command_repeats: 1"));
}

#[test]
fn test_nec_address_out_of_range_only() {
    let p = params(&[("address", Value::Int(0x10000)), ("command", Value::Int(0x5678))]);
    let err = validate("nec", &p).expect_err("address too big");
    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("address"), Some(&FieldErrorKind::AboveMaximum { max: 0xFFFF }));
    assert!(errors.get("address").map(FieldErrorKind::is_range_error).unwrap_or(false));
}

#[test]
fn test_midea_wrong_length() {
    let p = params(&[("code", Value::from(vec![0xA1, 0xB2, 0xC3, 0xD4]))]);
    let err = validate("midea", &p).expect_err("4 bytes");
    assert!(matches!(
        field_error(&err, "code"),
        Some(FieldErrorKind::WrongLength { actual: 4, .. })
    ));
    let msg = err.field_errors().map(|e| e.to_messages()).unwrap_or_default();
    assert!(msg["code"].contains("length"), "{:?}", msg);
}

#[test]
fn test_rc5_address_above_max() {
    let p = params(&[("address", Value::Int(32)), ("command", Value::Int(10))]);
    let err = validate("rc5", &p).expect_err("address 32");
    assert_eq!(field_error(&err, "address"), Some(&FieldErrorKind::AboveMaximum { max: 31 }));
    assert!(field_error(&err, "command").is_none());
}

#[test]
fn test_form_hex_input_validates() {
    let mut raw = IndexMap::new();
    raw.insert("address".to_string(), RawValue::from("0x1234"));
    raw.insert("command".to_string(), RawValue::from("0x5678"));
    let coerced = coerce_params(&raw);
    assert_eq!(coerced["address"], Value::Int(4660));
    let action = validate_coerced("nec", &coerced).expect("valid");
    assert_eq!(action.params["address"], Value::Int(4660));
}

#[test]
fn test_json_export_of_two_codes() {
    let power = RemoteCode::validated(
        "Power",
        "nec",
        &params(&[("address", Value::Int(0x04)), ("command", Value::Int(0x08))]),
    )
    .expect("power");
    let mute = RemoteCode::validated(
        "Mute",
        "nec",
        &params(&[("address", Value::Int(0x04)), ("command", Value::Int(0x09))]),
    )
    .expect("mute");
    let device = DeviceMeta {
        name: "Living Room TV".to_string(),
        manufacturer: "LG".to_string(),
        model: None,
        device_type: "TV".to_string(),
    };
    let doc = irprotokit::build_export_document(&device, &[power, mute], ExportFormat::Json).expect("export");
    let v: serde_json::Value = serde_json::from_str(&doc).expect("json");
    let codes = v["codes"].as_array().expect("codes array");
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[0]["id"], 1);
    assert_eq!(codes[1]["id"], 2);
    assert_eq!(codes[0]["buttonName"], "Power");
    assert_eq!(v["exportInfo"]["totalCodes"], 2);
    assert_eq!(v["device"]["name"], "Living Room TV");
}

#[test]
fn test_coercion_examples() {
    assert_eq!(coerce_text("0x1234"), Some(Value::Int(4660)));
    assert_eq!(
        coerce_text("[0xA1, 0xB2, 0xC3, 0xD4, 0xE5]"),
        Some(Value::from(vec![161, 178, 195, 212, 229]))
    );
    assert_eq!(coerce_text("true"), Some(Value::Bool(true)));
    assert_eq!(coerce_text("false"), Some(Value::Bool(false)));
    assert_eq!(coerce_text(""), None);
}

#[test]
fn test_protocol_case_insensitive() {
    let p = params(&[("address", Value::Int(70000)), ("command", Value::Int(1))]);
    let results: Vec<_> = ["NEC", "Nec", "nec"].iter().map(|id| validate(id, &p)).collect();
    assert!(results.iter().all(|r| r == &results[0]));
    let p = params(&[("address", Value::Int(7)), ("command", Value::Int(1))]);
    for id in ["NEC", "Nec", "nec"] {
        assert_eq!(validate(id, &p).expect("valid").protocol, ProtocolId::Nec);
    }
}

#[test]
fn test_unknown_protocol_is_top_level() {
    let p = params(&[("address", Value::Int(1))]);
    let err = validate("unknown", &p).expect_err("unknown");
    assert!(matches!(err, ValidationError::UnknownProtocol(ref s) if s == "unknown"));
    assert!(err.field_errors().is_none());
}

#[test]
fn test_api_request_aggregates_messages() {
    let req: TransmitRequest = serde_json::from_str(
        r#"{"protocol": "Samsung", "params": {"data": "0xE0E040BF", "nbits": 70}}"#,
    )
    .expect("request");
    let err = TransmitAction::from_request(req).expect_err("invalid");
    let msg = err.to_string();
    assert!(msg.contains("data: wrong type"), "{}", msg);
    assert!(msg.contains("nbits: out of range: above maximum of 64"), "{}", msg);
}

#[test]
fn test_form_and_api_agree_on_invalid_fields() {
    let mut raw = IndexMap::new();
    raw.insert("source_address".to_string(), RawValue::from("0x10000"));
    raw.insert("destination_address".to_string(), RawValue::from("12"));
    raw.insert("message_type".to_string(), RawValue::from("yes"));
    raw.insert("data".to_string(), RawValue::from("[1, 2, 3, 4, 5, 6, 7, 8]"));
    raw.insert("ui_hint".to_string(), RawValue::from("ignored"));
    let coerced = coerce_params(&raw);
    let form = validate_coerced("abbwelcome", &coerced).expect_err("form");
    let api = validate("abbwelcome", &coerced).expect_err("api");
    assert_eq!(form, api);
    let fields: Vec<_> = api.field_errors().expect("fields").iter().map(|e| e.field).collect();
    assert_eq!(fields, ["source_address", "message_type", "data"]);
}

#[test]
fn test_form_code_flow() {
    let code = FormCode {
        name: "Power".to_string(),
        protocol: "Midea".to_string(),
        parameters: [(
            "code".to_string(),
            RawValue::from("[0xA1, 0x82, 0x48, 0xFF, 0xFF]"),
        )]
        .into_iter()
        .collect(),
    };
    assert!(validate_code(&code).is_valid());
}

#[test]
fn test_esphome_export_embeds_blocks() {
    let code = RemoteCode::validated(
        "Vol Up!",
        "midea",
        &params(&[("code", Value::from(vec![0xA1, 0x82, 0x48, 0xFF, 0x05]))]),
    )
    .expect("valid");
    let device = DeviceMeta {
        name: "Bedroom AC".to_string(),
        manufacturer: "Midea".to_string(),
        model: None,
        device_type: "Air Conditioner".to_string(),
    };
    let doc = Exporter::default()
        .build(&device, std::slice::from_ref(&code), ExportFormat::Esphome)
        .expect("export");
    let id = sanitize_device_id(&device.name);
    assert_eq!(id, "bedroomac");
    assert!(doc.contains("# Device: Bedroom AC (Midea)\n"));
    assert!(doc.contains("    name: \"Bedroom AC Vol Up\"\n"));
    assert!(doc.contains("    id: bedroomac_vol_up\n"));
    assert!(doc.contains(&code.code_block()));
    assert!(doc.contains("code: [0xA1, 0x82, 0x48, 0xFF, 0x05]"));
}

#[test]
fn test_remote_code_serde() {
    let json = r#"{"name": "Power", "protocol": "RC5", "parameters": {"address": 5, "command": 12}}"#;
    let code: RemoteCode = serde_json::from_str(json).expect("code");
    assert_eq!(code.protocol, ProtocolId::Rc5);
    let back = serde_json::to_value(&code).expect("serialize");
    assert_eq!(back["protocol"], "rc5");
    assert_eq!(back["parameters"]["command"], 12);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn coercion_never_panics(text in "\\PC{0,40}") {
            let _ = coerce_text(&text);
        }

        #[test]
        fn hex_text_coerces_to_its_value(n in 0i64..=0xFFFF_FFFF) {
            prop_assert_eq!(coerce_text(&format!("0x{:X}", n)), Some(Value::Int(n)));
            prop_assert_eq!(coerce_text(&format!("  {}  ", n)), Some(Value::Int(n)));
        }

        #[test]
        fn validation_is_total(
            index in 0usize..ProtocolId::ALL.len(),
            values in proptest::collection::vec("\\PC{0,12}", 0..6),
        ) {
            let protocol = ProtocolId::ALL[index];
            let raw: IndexMap<String, RawValue> = protocol
                .schema()
                .fields
                .iter()
                .zip(values.iter())
                .map(|(f, v)| (f.name.to_string(), RawValue::from(v.as_str())))
                .collect();
            let coerced = coerce_params(&raw);
            let api = validate(protocol.as_str(), &coerced);
            let form = validate_coerced(protocol.as_str(), &coerced);
            prop_assert_eq!(api.as_ref().err(), form.as_ref().err());
            if let Ok(action) = form {
                let block = format_code_block(action.protocol, &action.params);
                prop_assert!(block.starts_with("      - remote_transmitter.transmit_"));
            }
        }

        #[test]
        fn nec_accepts_exactly_sixteen_bit_addresses(address in -100i64..70_000) {
            let p = params(&[("address", Value::Int(address)), ("command", Value::Int(0))]);
            prop_assert_eq!(validate("nec", &p).is_ok(), (0..=0xFFFF).contains(&address));
        }
    }
}
