//! Render validated parameters as an ESPHome `remote_transmitter.transmit_<protocol>` block.
//!
//! Protocols with a dedicated rule print their known fields in a fixed order with a
//! fixed representation per field. Every other protocol goes through the generic
//! renderer, which walks the mapping in insertion order.

use crate::registry::ProtocolId;
use crate::value::{ParamMap, Value};
use std::fmt::Write;

const ACTION_INDENT: &str = "      ";
const PARAM_INDENT: &str = "          ";

/// How one field is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `key: value`
    Scalar,
    /// `key: [0xA1, 0xB2]`
    HexBytes,
    /// `key: [9000, -4500]`
    DecimalList,
    /// `key: "value"`
    Quoted,
    /// `key: 38000Hz`
    Hertz,
}

/// Dedicated rendering rule for one protocol.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub fields: &'static [(&'static str, Style)],
    /// Lines appended unconditionally after the fields.
    pub trailer: Option<&'static str>,
}

const ADDRESS_COMMAND: Rule = Rule {
    fields: &[("address", Style::Scalar), ("command", Style::Scalar)],
    trailer: None,
};
const DATA_NBITS: Rule = Rule {
    fields: &[("data", Style::Scalar), ("nbits", Style::Scalar)],
    trailer: None,
};
const RC_CODES: Rule = Rule {
    fields: &[("rc_code_1", Style::Scalar), ("rc_code_2", Style::Scalar)],
    trailer: None,
};
const BYTE_CODE: Rule = Rule {
    fields: &[("code", Style::HexBytes)],
    trailer: None,
};

/// Strategy table: `None` selects the generic renderer.
pub fn rule_for(protocol: ProtocolId) -> Option<Rule> {
    use ProtocolId::*;
    let rule = match protocol {
        Nec => Rule {
            fields: &[
                ("address", Style::Scalar),
                ("command", Style::Scalar),
                ("command_repeats", Style::Scalar),
            ],
            trailer: None,
        },
        Samsung | Sony | Lg => DATA_NBITS,
        Samsung36 | Panasonic | Rc5 | Rc6 | Dish => ADDRESS_COMMAND,
        Jvc => Rule {
            fields: &[("data", Style::Scalar)],
            trailer: None,
        },
        Pioneer | ToshibaAc => RC_CODES,
        Coolix => Rule {
            fields: &[("first", Style::Scalar), ("second", Style::Scalar)],
            trailer: None,
        },
        Midea | Haier => BYTE_CODE,
        Aeha => Rule {
            fields: &[
                ("address", Style::Scalar),
                ("data", Style::HexBytes),
                ("carrier_frequency", Style::Hertz),
            ],
            trailer: None,
        },
        Raw => Rule {
            fields: &[("code", Style::DecimalList), ("carrier_frequency", Style::Hertz)],
            trailer: None,
        },
        Pronto => Rule {
            fields: &[("data", Style::Quoted)],
            trailer: None,
        },
        Roomba => Rule {
            fields: &[("data", Style::Scalar)],
            trailer: Some("repeat:\n            times: 3\n            wait_time: 17ms\n"),
        },
        Toto => Rule {
            fields: &[
                ("command", Style::Scalar),
                ("rc_code_1", Style::Scalar),
                ("rc_code_2", Style::Scalar),
            ],
            trailer: None,
        },
        _ => return None,
    };
    Some(rule)
}

/// Render one transmit block (header line plus one line per parameter).
pub fn format_code_block(protocol: ProtocolId, params: &ParamMap) -> String {
    let mut out = format!("{}- remote_transmitter.transmit_{}:\n", ACTION_INDENT, protocol);
    match rule_for(protocol) {
        Some(rule) => render_rule(&mut out, &rule, params),
        None => render_generic(&mut out, params),
    }
    out
}

fn render_rule(out: &mut String, rule: &Rule, params: &ParamMap) {
    for (name, style) in rule.fields {
        if let Some(v) = params.get(*name) {
            let _ = writeln!(out, "{}{}: {}", PARAM_INDENT, name, styled(v, *style));
        }
    }
    if let Some(trailer) = rule.trailer {
        out.push_str(PARAM_INDENT);
        out.push_str(trailer);
    }
}

fn render_generic(out: &mut String, params: &ParamMap) {
    for (key, v) in params {
        let rendered = match v {
            Value::Str(s) if s.is_empty() => continue,
            Value::List(_) => styled(v, Style::HexBytes),
            Value::Str(s) if !s.starts_with("0x") && !looks_numeric(s) => quoted(s),
            _ => v.to_string(),
        };
        let _ = writeln!(out, "{}{}: {}", PARAM_INDENT, key, rendered);
    }
}

fn styled(v: &Value, style: Style) -> String {
    match (style, v) {
        (Style::HexBytes, Value::List(items)) => bracketed(items, hex_byte),
        (Style::DecimalList, Value::List(items)) => bracketed(items, |item| item.to_string()),
        (Style::Quoted, _) => quoted(&v.to_string()),
        (Style::Hertz, _) => format!("{}Hz", v),
        _ => v.to_string(),
    }
}

fn bracketed(items: &[Value], f: impl Fn(&Value) -> String) -> String {
    let parts: Vec<String> = items.iter().map(f).collect();
    format!("[{}]", parts.join(", "))
}

/// `0xNN`, uppercase, at least two digits. Non-numeric elements print verbatim.
pub fn hex_byte(v: &Value) -> String {
    match v.as_integer() {
        Some(n) if n < 0 => format!("-0x{:02X}", n.unsigned_abs()),
        Some(n) => format!("0x{:02X}", n),
        None => v.to_string(),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s)
}

fn looks_numeric(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}
