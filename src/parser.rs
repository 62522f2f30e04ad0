//! Parse form field text into typed literals using PEST.

use crate::value::{float_to_i64, Value};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "literal.pest"]
struct LiteralParser;

/// Parse one trimmed literal: hex integer, decimal number, boolean or bracketed
/// integer list. Anything else (including a hex or list literal whose digits do not
/// fit in i64) is an error; the caller keeps the original text.
pub fn parse_literal(source: &str) -> Result<Value, String> {
    let pairs = LiteralParser::parse(Rule::literal, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let literal = pairs.into_iter().next().ok_or("Empty parse")?;
    let inner = literal
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or("Empty literal")?;
    build_value(inner)
}

fn build_value(pair: pest::iterators::Pair<Rule>) -> Result<Value, String> {
    match pair.as_rule() {
        Rule::hex_int => parse_hex(pair.as_str()).map(Value::Int),
        Rule::dec_int => pair
            .as_str()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| format!("integer {}: {}", pair.as_str(), e)),
        Rule::number => parse_number(pair.as_str()),
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "true")),
        Rule::list => {
            let items = pair
                .into_inner()
                .map(build_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(items))
        }
        other => Err(format!("unexpected rule: {:?}", other)),
    }
}

fn parse_hex(s: &str) -> Result<i64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| format!("missing 0x prefix: {}", s))?;
    i64::from_str_radix(digits, 16).map_err(|e| format!("hex {}: {}", s, e))
}

fn parse_number(s: &str) -> Result<Value, String> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    let f: f64 = s.parse().map_err(|e| format!("number {}: {}", s, e))?;
    if !f.is_finite() {
        return Err(format!("number out of range: {}", s));
    }
    Ok(match float_to_i64(f) {
        Some(i) => Value::Int(i),
        None => Value::Float(f),
    })
}
