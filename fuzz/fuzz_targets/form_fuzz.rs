//! Form fuzz target: split arbitrary bytes into a protocol name and parameter texts,
//! then coerce, validate and render. Nothing on this path may panic.
//! Build with: cargo fuzz run form_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let mut parts = s.split('\n');
    let protocol = parts.next().unwrap_or_default();
    let raw: indexmap::IndexMap<String, irprotokit::RawValue> = parts
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), irprotokit::RawValue::from(v)))
        .collect();
    let coerced = irprotokit::coerce_params(&raw);
    if let Ok(action) = irprotokit::validate_coerced(protocol, &coerced) {
        let _ = irprotokit::format_code_block(action.protocol, &action.params);
    }
    let _ = irprotokit::validate(protocol, &coerced);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run form_fuzz");
}
