//! Export documents: ESPHome YAML (flat or grouped under a sub-device) and a JSON dump.
//!
//! Each document is rebuilt from the codes on every call; nothing here is cached.

use crate::config::ExportConfig;
use crate::format::format_code_block;
use crate::registry::ProtocolId;
use crate::validate::{validate, ValidationError};
use crate::value::ParamMap;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Fixed tag importers key on; independent of the configurable generator name.
pub const JSON_FORMAT_TAG: &str = "Remote Control Hub JSON Export v1.0";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One remote function with its protocol parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCode {
    pub name: String,
    pub protocol: ProtocolId,
    pub parameters: ParamMap,
}

impl RemoteCode {
    /// Validate `parameters` for `protocol` and build a code from the declared fields.
    /// `name` must not be blank; it becomes the button label.
    pub fn validated(name: &str, protocol: &str, parameters: &ParamMap) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        let action = validate(protocol, parameters)?;
        Ok(RemoteCode {
            name: name.to_string(),
            protocol: action.protocol,
            parameters: action.params,
        })
    }

    /// Rendered transmit block for this code.
    pub fn code_block(&self) -> String {
        format_code_block(self.protocol, &self.parameters)
    }
}

/// Device the exported codes belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMeta {
    pub name: String,
    pub manufacturer: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub device_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Template buttons under a top-level `button:` list.
    Esphome,
    /// Same buttons attached to an `esphome: devices:` sub-device.
    EsphomeSubdevice,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format: {0} (expected esphome, esphome-subdevice or json)")]
pub struct UnknownFormat(pub String);

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Esphome, ExportFormat::EsphomeSubdevice, ExportFormat::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Esphome => "esphome",
            ExportFormat::EsphomeSubdevice => "esphome-subdevice",
            ExportFormat::Json => "json",
        }
    }

    /// Filename part between the device name and the date.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ExportFormat::Esphome => "esphome_config",
            ExportFormat::EsphomeSubdevice => "esphome_subdevice_config",
            ExportFormat::Json => "remote_codes",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Esphome | ExportFormat::EsphomeSubdevice => "yaml",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Esphome | ExportFormat::EsphomeSubdevice => "text/yaml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Device identifier prefix: drop everything outside `[A-Za-z0-9_]`, lowercase.
pub fn sanitize_device_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

/// Button display label: drop everything outside `[A-Za-z0-9_\s]`, trim. Case is kept.
pub fn sanitize_button_label(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Entity id of a button: `<device_id>_<label with whitespace runs as '_', lowercased>`.
pub fn button_id(device_id: &str, label: &str) -> String {
    format!("{}_{}", device_id, WHITESPACE_RUN.replace_all(label, "_").to_lowercase())
}

/// Download filename: `<name>_<format suffix>_<YYYY-MM-DD>.<ext>`.
pub fn export_file_name(device_name: &str, format: ExportFormat, date: NaiveDate) -> String {
    let stripped: String = device_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let name = WHITESPACE_RUN.replace_all(&stripped, "_").to_lowercase();
    format!(
        "{}_{}_{}.{}",
        name,
        format.file_suffix(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    device: JsonDevice<'a>,
    export_info: JsonExportInfo,
    codes: Vec<JsonCode<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDevice<'a> {
    name: &'a str,
    manufacturer: &'a str,
    model: Option<&'a str>,
    device_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExportInfo {
    exported_at: String,
    total_codes: usize,
    format: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCode<'a> {
    id: usize,
    button_name: &'a str,
    protocol: ProtocolId,
    parameters: &'a ParamMap,
    esphome_code: String,
}

/// Builds export documents with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Exporter { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build a document stamped with the current time.
    pub fn build(&self, device: &DeviceMeta, codes: &[RemoteCode], format: ExportFormat) -> Result<String, ExportError> {
        self.build_at(device, codes, format, Utc::now())
    }

    /// Build a document stamped with `at`.
    pub fn build_at(
        &self,
        device: &DeviceMeta,
        codes: &[RemoteCode],
        format: ExportFormat,
        at: DateTime<Utc>,
    ) -> Result<String, ExportError> {
        let doc = match format {
            ExportFormat::Esphome => self.esphome(device, codes, at, false),
            ExportFormat::EsphomeSubdevice => self.esphome(device, codes, at, true),
            ExportFormat::Json => self.json(device, codes, at)?,
        };
        tracing::debug!(
            device = %device.name,
            format = format.as_str(),
            codes = codes.len(),
            bytes = doc.len(),
            "built export document"
        );
        Ok(doc)
    }

    fn esphome(&self, device: &DeviceMeta, codes: &[RemoteCode], at: DateTime<Utc>, grouped: bool) -> String {
        let device_id = sanitize_device_id(&device.name);
        let sub_device_id = format!("{}_device", device_id);
        let display_name = yaml_escape(&device.name);
        let comment_name = comment_text(&device.name);
        let model = device
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| format!(" {}", comment_text(m)))
            .unwrap_or_default();

        let mut out = String::new();
        let title = if grouped {
            "# ESPHome Remote Control Configuration with Sub-Devices"
        } else {
            "# ESPHome Remote Control Configuration"
        };
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "# Device: {} ({}{})", comment_name, comment_text(&device.manufacturer), model);
        let _ = writeln!(out, "# Generated by {}", comment_text(&self.config.generator));
        let _ = writeln!(out, "# Generated on: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "# Total codes: {}", codes.len());
        out.push('\n');
        out.push_str("# Add this to your ESPHome configuration file\n\n");
        out.push_str("# Remote transmitter configuration (add to your main config if not already present)\n");
        out.push_str("remote_transmitter:\n");
        let _ = writeln!(out, "  pin: {}  # Change this to your IR LED pin", self.config.transmitter_pin);
        let _ = writeln!(out, "  carrier_duty_percent: {}%", self.config.carrier_duty_percent);
        out.push('\n');

        if grouped {
            let _ = writeln!(out, "# Sub-device configuration for {}", comment_name);
            out.push_str("esphome:\n  devices:\n");
            let _ = writeln!(out, "    - id: {}", sub_device_id);
            let _ = writeln!(out, "      name: \"{}\"", display_name);
            out.push('\n');
            let _ = writeln!(out, "# Button entities for {} associated with sub-device", comment_name);
        } else {
            let _ = writeln!(out, "# Button entities for {}", comment_name);
        }
        out.push_str("button:\n");

        for code in codes {
            let label = sanitize_button_label(&code.name);
            out.push_str("  - platform: template\n");
            let _ = writeln!(out, "    name: \"{} {}\"", display_name, yaml_escape(&label));
            let _ = writeln!(out, "    id: {}", button_id(&device_id, &label));
            if grouped {
                let _ = writeln!(out, "    device_id: {}", sub_device_id);
            }
            out.push_str("    on_press:\n");
            out.push_str(&code.code_block());
            out.push('\n');
        }
        out
    }

    fn json(&self, device: &DeviceMeta, codes: &[RemoteCode], at: DateTime<Utc>) -> Result<String, ExportError> {
        let export = JsonExport {
            device: JsonDevice {
                name: &device.name,
                manufacturer: &device.manufacturer,
                model: device.model.as_deref().filter(|m| !m.is_empty()),
                device_type: &device.device_type,
            },
            export_info: JsonExportInfo {
                exported_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
                total_codes: codes.len(),
                format: JSON_FORMAT_TAG.to_string(),
            },
            codes: codes
                .iter()
                .enumerate()
                .map(|(i, code)| JsonCode {
                    id: i + 1,
                    button_name: &code.name,
                    protocol: code.protocol,
                    parameters: &code.parameters,
                    esphome_code: code.code_block(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

/// Build a document with the default configuration, stamped with the current time.
pub fn build_export_document(
    device: &DeviceMeta,
    codes: &[RemoteCode],
    format: ExportFormat,
) -> Result<String, ExportError> {
    Exporter::default().build(device, codes, format)
}

/// Escape for a double-quoted YAML scalar.
fn yaml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Text for a `#` comment line: control characters and line separators become spaces.
fn comment_text(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::TimeZone;

    fn nec(name: &str, address: i64, command: i64) -> RemoteCode {
        let params: ParamMap = [
            ("address".to_string(), Value::Int(address)),
            ("command".to_string(), Value::Int(command)),
        ]
        .into_iter()
        .collect();
        RemoteCode::validated(name, "nec", &params).expect("valid nec")
    }

    fn tv() -> DeviceMeta {
        DeviceMeta {
            name: "Living Room TV".to_string(),
            manufacturer: "Samsung".to_string(),
            model: Some("UE55".to_string()),
            device_type: "TV".to_string(),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).single().expect("valid time")
    }

    #[test]
    fn sanitizers() {
        assert_eq!(sanitize_device_id("Living Room TV"), "livingroomtv");
        assert_eq!(sanitize_device_id("My_TV-2!"), "my_tv2");
        assert_eq!(sanitize_button_label("  Volume Up! "), "Volume Up");
        assert_eq!(sanitize_button_label("OK/Enter"), "OKEnter");
        assert_eq!(button_id("livingroomtv", "Volume  Up"), "livingroomtv_volume_up");
    }

    #[test]
    fn file_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).expect("date");
        assert_eq!(
            export_file_name("Living Room TV", ExportFormat::Esphome, date),
            "living_room_tv_esphome_config_2025-03-01.yaml"
        );
        assert_eq!(
            export_file_name("Living Room TV!", ExportFormat::EsphomeSubdevice, date),
            "living_room_tv_esphome_subdevice_config_2025-03-01.yaml"
        );
        assert_eq!(
            export_file_name("Living Room TV", ExportFormat::Json, date),
            "living_room_tv_remote_codes_2025-03-01.json"
        );
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("esphome".parse::<ExportFormat>(), Ok(ExportFormat::Esphome));
        assert_eq!("ESPHOME-SUBDEVICE".parse::<ExportFormat>(), Ok(ExportFormat::EsphomeSubdevice));
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn esphome_document() {
        let codes = [nec("Power", 4660, 22136)];
        let doc = Exporter::default()
            .build_at(&tv(), &codes, ExportFormat::Esphome, at())
            .unwrap();
        let expected = "\
# ESPHome Remote Control Configuration
# Device: Living Room TV (Samsung UE55)
# Generated by Remote Control Hub
# Generated on: 2025-03-01 12:30:00 UTC
# Total codes: 1

# Add this to your ESPHome configuration file

# Remote transmitter configuration (add to your main config if not already present)
remote_transmitter:
  pin: GPIO14  # Change this to your IR LED pin
  carrier_duty_percent: 50%

# Button entities for Living Room TV
button:
  - platform: template
    name: \"Living Room TV Power\"
    id: livingroomtv_power
    on_press:
      - remote_transmitter.transmit_nec:
          address: 4660
          command: 22136

";
        assert_eq!(doc, expected);
    }

    #[test]
    fn subdevice_document_links_buttons() {
        let codes = [nec("Power", 1, 2), nec("Volume Up", 1, 3)];
        let config = ExportConfig {
            transmitter_pin: "GPIO4".to_string(),
            ..Default::default()
        };
        let doc = Exporter::new(config)
            .build_at(&tv(), &codes, ExportFormat::EsphomeSubdevice, at())
            .unwrap();
        assert!(doc.starts_with("# ESPHome Remote Control Configuration with Sub-Devices\n"));
        assert!(doc.contains("  pin: GPIO4  #"));
        assert!(doc.contains("esphome:\n  devices:\n    - id: livingroomtv_device\n      name: \"Living Room TV\"\n"));
        assert_eq!(doc.matches("    device_id: livingroomtv_device\n").count(), 2);
        assert!(doc.contains("    id: livingroomtv_volume_up\n"));
    }

    #[test]
    fn json_document() {
        let codes = [nec("Power", 4660, 22136), nec("Mute", 4660, 1)];
        let doc = Exporter::default()
            .build_at(&tv(), &codes, ExportFormat::Json, at())
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(v["device"]["deviceType"], "TV");
        assert_eq!(v["exportInfo"]["totalCodes"], 2);
        assert_eq!(v["exportInfo"]["exportedAt"], "2025-03-01T12:30:00.000Z");
        assert_eq!(v["exportInfo"]["format"], "Remote Control Hub JSON Export v1.0");
        assert_eq!(v["codes"][0]["id"], 1);
        assert_eq!(v["codes"][1]["id"], 2);
        assert_eq!(v["codes"][1]["buttonName"], "Mute");
        assert_eq!(v["codes"][0]["protocol"], "nec");
        assert_eq!(v["codes"][0]["parameters"]["address"], 4660);
        assert_eq!(v["codes"][0]["esphomeCode"], codes[0].code_block());
    }

    #[test]
    fn json_model_is_null_when_absent() {
        for model in [None, Some(String::new())] {
            let device = DeviceMeta { model, ..tv() };
            let doc = Exporter::default().build_at(&device, &[], ExportFormat::Json, at()).unwrap();
            let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
            assert!(v["device"]["model"].is_null(), "{}", v["device"]);
            assert_eq!(v["codes"].as_array().map(Vec::len), Some(0));
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let params: ParamMap = [
            ("address".to_string(), Value::Int(1)),
            ("command".to_string(), Value::Int(2)),
        ]
        .into_iter()
        .collect();
        for name in ["", "  ", "\t"] {
            let err = RemoteCode::validated(name, "nec", &params).unwrap_err();
            assert_eq!(err, ValidationError::BlankName);
            assert_eq!(err.to_string(), "function name is required");
            assert!(err.field_errors().is_none());
        }
        assert!(RemoteCode::validated(" Power ", "nec", &params).is_ok());
    }

    #[test]
    fn json_format_tag_is_fixed() {
        let config = ExportConfig {
            generator: "My Lib".to_string(),
            ..Default::default()
        };
        let exporter = Exporter::new(config);
        let codes = [nec("Power", 1, 2)];
        let json = exporter.build_at(&tv(), &codes, ExportFormat::Json, at()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["exportInfo"]["format"], JSON_FORMAT_TAG);
        let yaml = exporter.build_at(&tv(), &codes, ExportFormat::Esphome, at()).unwrap();
        assert!(yaml.contains("# Generated by My Lib\n"));
    }

    #[test]
    fn line_breaks_cannot_add_yaml_keys() {
        let device = DeviceMeta {
            name: "TV\nota: {password: x}".to_string(),
            manufacturer: "Acme\r\nwifi: {}".to_string(),
            model: Some("M1\napi:".to_string()),
            device_type: "TV".to_string(),
        };
        let codes = [nec("Power\nOff", 1, 2)];
        for format in [ExportFormat::Esphome, ExportFormat::EsphomeSubdevice] {
            let doc = Exporter::default().build_at(&device, &codes, format, at()).unwrap();
            let top_level: Vec<&str> = doc
                .lines()
                .filter(|l| !l.is_empty() && !l.starts_with(' ') && !l.starts_with('#'))
                .collect();
            assert!(
                top_level
                    .iter()
                    .all(|l| ["remote_transmitter:", "esphome:", "button:"].contains(l)),
                "{:?}",
                top_level
            );
            assert!(doc.contains("# Device: TV ota: {password: x} (Acme  wifi: {} M1 api:)\n"));
            assert!(doc.contains("    name: \"TV\\nota: {password: x} Power\\nOff\"\n"));
            assert!(doc.contains("    id: tvotapasswordx_power_off\n"));
        }
    }

    #[test]
    fn yaml_escape_handles_quotes_and_controls() {
        assert_eq!(yaml_escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
        assert_eq!(yaml_escape("a\tb\r\n"), "a\\tb\\r\\n");
        assert_eq!(yaml_escape("x\u{7}"), "x\\u0007");
        assert_eq!(comment_text("a\nb\u{2028}c"), "a b c");
    }
}
