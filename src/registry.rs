//! Protocol catalog: every supported ESPHome `remote_transmitter` protocol and the
//! parameter schema its transmit action accepts.
//!
//! The catalog is static data. Lookups are case-insensitive; the canonical form of a
//! protocol identifier is lowercase.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Protocol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolId {
    Nec,
    Samsung,
    Samsung36,
    Sony,
    Lg,
    Panasonic,
    Rc5,
    Rc6,
    Jvc,
    Pioneer,
    Coolix,
    Midea,
    Haier,
    ToshibaAc,
    Mirage,
    Dish,
    Pronto,
    Raw,
    Aeha,
    Beo4,
    ByronSx,
    CanalSat,
    CanalSatLd,
    Dooya,
    Drayton,
    GoBox,
    KeeLoq,
    MagiQuest,
    Nexa,
    Roomba,
    Toto,
    AbbWelcome,
    RcSwitchRaw,
    RcSwitchTypeA,
    RcSwitchTypeB,
    RcSwitchTypeC,
    RcSwitchTypeD,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown protocol: {0}")]
pub struct UnknownProtocol(pub String);

impl ProtocolId {
    /// All protocols, in catalog order.
    pub const ALL: [ProtocolId; 37] = [
        ProtocolId::Nec,
        ProtocolId::Samsung,
        ProtocolId::Samsung36,
        ProtocolId::Sony,
        ProtocolId::Lg,
        ProtocolId::Panasonic,
        ProtocolId::Rc5,
        ProtocolId::Rc6,
        ProtocolId::Jvc,
        ProtocolId::Pioneer,
        ProtocolId::Coolix,
        ProtocolId::Midea,
        ProtocolId::Haier,
        ProtocolId::ToshibaAc,
        ProtocolId::Mirage,
        ProtocolId::Dish,
        ProtocolId::Pronto,
        ProtocolId::Raw,
        ProtocolId::Aeha,
        ProtocolId::Beo4,
        ProtocolId::ByronSx,
        ProtocolId::CanalSat,
        ProtocolId::CanalSatLd,
        ProtocolId::Dooya,
        ProtocolId::Drayton,
        ProtocolId::GoBox,
        ProtocolId::KeeLoq,
        ProtocolId::MagiQuest,
        ProtocolId::Nexa,
        ProtocolId::Roomba,
        ProtocolId::Toto,
        ProtocolId::AbbWelcome,
        ProtocolId::RcSwitchRaw,
        ProtocolId::RcSwitchTypeA,
        ProtocolId::RcSwitchTypeB,
        ProtocolId::RcSwitchTypeC,
        ProtocolId::RcSwitchTypeD,
    ];

    /// Canonical lowercase identifier (also the ESPHome `transmit_<id>` suffix).
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolId::Nec => "nec",
            ProtocolId::Samsung => "samsung",
            ProtocolId::Samsung36 => "samsung36",
            ProtocolId::Sony => "sony",
            ProtocolId::Lg => "lg",
            ProtocolId::Panasonic => "panasonic",
            ProtocolId::Rc5 => "rc5",
            ProtocolId::Rc6 => "rc6",
            ProtocolId::Jvc => "jvc",
            ProtocolId::Pioneer => "pioneer",
            ProtocolId::Coolix => "coolix",
            ProtocolId::Midea => "midea",
            ProtocolId::Haier => "haier",
            ProtocolId::ToshibaAc => "toshiba_ac",
            ProtocolId::Mirage => "mirage",
            ProtocolId::Dish => "dish",
            ProtocolId::Pronto => "pronto",
            ProtocolId::Raw => "raw",
            ProtocolId::Aeha => "aeha",
            ProtocolId::Beo4 => "beo4",
            ProtocolId::ByronSx => "byronsx",
            ProtocolId::CanalSat => "canalsat",
            ProtocolId::CanalSatLd => "canalsatld",
            ProtocolId::Dooya => "dooya",
            ProtocolId::Drayton => "drayton",
            ProtocolId::GoBox => "gobox",
            ProtocolId::KeeLoq => "keeloq",
            ProtocolId::MagiQuest => "magiquest",
            ProtocolId::Nexa => "nexa",
            ProtocolId::Roomba => "roomba",
            ProtocolId::Toto => "toto",
            ProtocolId::AbbWelcome => "abbwelcome",
            ProtocolId::RcSwitchRaw => "rc_switch_raw",
            ProtocolId::RcSwitchTypeA => "rc_switch_type_a",
            ProtocolId::RcSwitchTypeB => "rc_switch_type_b",
            ProtocolId::RcSwitchTypeC => "rc_switch_type_c",
            ProtocolId::RcSwitchTypeD => "rc_switch_type_d",
        }
    }

    pub fn schema(self) -> &'static ParameterSchema {
        // SCHEMAS is in the same order as ALL; checked by `schemas_follow_catalog_order`.
        &SCHEMAS[self as usize]
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolId {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ProtocolId::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

impl Serialize for ProtocolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProtocolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Allowed element count of a byte array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    Exact(usize),
    Between { min: usize, max: usize },
}

impl ArrayLen {
    pub fn contains(self, n: usize) -> bool {
        match self {
            ArrayLen::Exact(len) => n == len,
            ArrayLen::Between { min, max } => (min..=max).contains(&n),
        }
    }
}

impl fmt::Display for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLen::Exact(n) => write!(f, "{}", n),
            ArrayLen::Between { min, max } => write!(f, "{} to {}", min, max),
        }
    }
}

/// String patterns used by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Pronto hex words separated by whitespace.
    HexWords,
    /// RC-switch binary string.
    Binary,
    /// RC-switch type C family letter.
    FamilyLetter,
}

static HEX_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f\s]+$").expect("hex words regex"));
static BINARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[01]+$").expect("binary regex"));
static FAMILY_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-pA-P]$").expect("family letter regex"));

impl Pattern {
    pub fn as_str(self) -> &'static str {
        self.regex().as_str()
    }

    pub fn regex(self) -> &'static Regex {
        match self {
            Pattern::HexWords => &*HEX_WORDS,
            Pattern::Binary => &*BINARY,
            Pattern::FamilyLetter => &*FAMILY_LETTER,
        }
    }

    /// Whole-string match (every catalog pattern is anchored).
    pub fn matches(self, s: &str) -> bool {
        self.regex().is_match(s)
    }
}

/// Shape and constraints of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Integer in `min..=max`; no upper bound when `max` is `None`.
    Integer { min: i64, max: Option<i64> },
    Boolean,
    /// List of bytes (each 0..=255).
    ByteArray { len: ArrayLen },
    /// List of signed integers, any length, no bounds (raw timings).
    IntArray,
    Pattern(Pattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub protocol: ProtocolId,
    pub fields: &'static [ParameterField],
}

impl ParameterSchema {
    pub fn field(&self, name: &str) -> Option<&'static ParameterField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static ParameterField> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Look up a schema by identifier (case-insensitive).
pub fn lookup(protocol: &str) -> Option<&'static ParameterSchema> {
    match protocol.parse::<ProtocolId>() {
        Ok(id) => Some(id.schema()),
        Err(_) => {
            tracing::debug!(protocol, "protocol not in catalog");
            None
        }
    }
}

/// All schemas in catalog order.
pub fn schemas() -> &'static [ParameterSchema] {
    &SCHEMAS
}

const fn int(name: &'static str, min: i64, max: i64, description: &'static str) -> ParameterField {
    ParameterField { name, kind: FieldKind::Integer { min, max: Some(max) }, required: true, description }
}

const fn opt_int(name: &'static str, min: i64, max: i64, description: &'static str) -> ParameterField {
    ParameterField { name, kind: FieldKind::Integer { min, max: Some(max) }, required: false, description }
}

const fn bytes(name: &'static str, len: ArrayLen, required: bool, description: &'static str) -> ParameterField {
    ParameterField { name, kind: FieldKind::ByteArray { len }, required, description }
}

const fn flag(name: &'static str, required: bool, description: &'static str) -> ParameterField {
    ParameterField { name, kind: FieldKind::Boolean, required, description }
}

const fn pattern(name: &'static str, pattern: Pattern, description: &'static str) -> ParameterField {
    ParameterField { name, kind: FieldKind::Pattern(pattern), required: true, description }
}

const U8: i64 = 0xFF;
const U16: i64 = 0xFFFF;
const U24: i64 = 0xFF_FFFF;
const U32: i64 = 0xFFFF_FFFF;
const U48: i64 = 0xFFFF_FFFF_FFFF;

const NEC: &[ParameterField] = &[
    int("address", 0, U16, "16-bit device address"),
    int("command", 0, U16, "16-bit command with inverse"),
    ParameterField {
        name: "command_repeats",
        kind: FieldKind::Integer { min: 1, max: None },
        required: false,
        description: "Number of command repeats (default: 1)",
    },
];

const SAMSUNG: &[ParameterField] = &[
    int("data", 0, U32, "Samsung code data"),
    opt_int("nbits", 1, 64, "Number of bits (default: 32)"),
];

const SAMSUNG36: &[ParameterField] = &[
    int("address", 0, U16, "Address to send"),
    int("command", 0, U32, "Samsung36 command"),
];

const SONY: &[ParameterField] = &[
    int("data", 0, U32, "Sony code data"),
    opt_int("nbits", 1, 64, "Number of bits (default: 12)"),
];

const LG: &[ParameterField] = &[
    int("data", 0, U32, "LG code data"),
    opt_int("nbits", 1, 64, "Number of bits (default: 28)"),
];

const PANASONIC: &[ParameterField] = &[
    int("address", 0, U16, "Device address"),
    int("command", 0, U16, "Command code"),
];

const RC5: &[ParameterField] = &[
    int("address", 0, 31, "Device address (0-31)"),
    int("command", 0, 63, "Command code (0-63)"),
];

const RC6: &[ParameterField] = &[
    int("address", 0, U16, "Device address"),
    int("command", 0, U16, "Command code"),
];

const JVC: &[ParameterField] = &[int("data", 0, U16, "JVC code data")];

const PIONEER: &[ParameterField] = &[
    int("rc_code_1", 0, U32, "Primary Pioneer remote code"),
    opt_int("rc_code_2", 0, U16, "Secondary Pioneer remote code"),
];

const COOLIX: &[ParameterField] = &[
    int("first", 0, U24, "First 24-bit Coolix code"),
    opt_int("second", 0, U24, "Second 24-bit Coolix code"),
];

const MIDEA: &[ParameterField] = &[bytes("code", ArrayLen::Exact(5), true, "5-byte Midea code array")];

const HAIER: &[ParameterField] = &[bytes("code", ArrayLen::Exact(13), true, "13-byte Haier code array")];

const TOSHIBA_AC: &[ParameterField] = &[
    int("rc_code_1", 0, U48, "First remote code"),
    opt_int("rc_code_2", 0, U48, "Second remote code"),
];

const MIRAGE: &[ParameterField] = &[bytes("code", ArrayLen::Exact(14), true, "14-byte Mirage code array")];

const DISH: &[ParameterField] = &[
    opt_int("address", 1, 16, "Receiver number (1-16, default: 1)"),
    int("command", 0, 63, "Dish command (0-63)"),
];

const PRONTO: &[ParameterField] = &[pattern("data", Pattern::HexWords, "Pronto hex string")];

const RAW: &[ParameterField] = &[ParameterField {
    name: "code",
    kind: FieldKind::IntArray,
    required: true,
    description: "Raw timing array (positive=ON, negative=OFF in µs)",
}];

const AEHA: &[ParameterField] = &[
    int("address", 0, U16, "Address to send"),
    bytes("data", ArrayLen::Between { min: 2, max: 35 }, true, "2-35 byte list"),
];

const BEO4: &[ParameterField] = &[
    int("source", 0, U8, "8-bit source"),
    int("command", 0, U8, "Command to send"),
];

const BYRONSX: &[ParameterField] = &[
    int("address", 0, U8, "8-bit ID code"),
    int("command", 0, U8, "Command to send"),
];

const CANALSAT: &[ParameterField] = &[
    int("device", 0, U8, "Device to send to"),
    opt_int("address", 0, U8, "Address or sub-device (default: 0)"),
    int("command", 0, U8, "Command to send"),
];

const DOOYA: &[ParameterField] = &[
    int("id", 0, U24, "24-bit ID code"),
    int("channel", 0, U8, "8-bit channel (0-255)"),
    int("button", 0, 15, "4-bit button (0-15)"),
    int("check", 0, 15, "4-bit check code"),
];

const DRAYTON: &[ParameterField] = &[
    int("address", 0, U16, "16-bit ID code"),
    int("channel", 0, 127, "Switch/channel (0-127)"),
    int("command", 0, 63, "Command to send (0-63)"),
];

const GOBOX: &[ParameterField] = &[int("code", 0, U16, "Go-Box command code")];

const KEELOQ: &[ParameterField] = &[
    int("address", 0, U32, "32-bit address"),
    int("command", 0, 15, "4-bit command/button code"),
    opt_int("code", 0, U32, "32-bit encrypted field"),
    flag("level", false, "Low battery level status bit"),
];

const MAGIQUEST: &[ParameterField] = &[
    int("wand_id", 0, U32, "MagiQuest wand ID"),
    opt_int("magnitude", 0, U16, "Magnitude of swishes/swirls"),
];

const NEXA: &[ParameterField] = &[
    int("device", 0, U24, "Nexa device code"),
    int("state", 0, 2, "Nexa state code (0=OFF, 1=ON, 2=DIM)"),
    int("group", 0, U8, "Nexa group code"),
    int("channel", 0, U8, "Nexa channel code"),
    int("level", 0, U8, "Nexa level code"),
];

const ROOMBA: &[ParameterField] = &[int("data", 0, U8, "Roomba command code")];

const TOTO: &[ParameterField] = &[
    int("command", 0, U8, "1-byte Toto command (0-255)"),
    opt_int("rc_code_1", 0, 15, "First 4-bit parameter"),
    opt_int("rc_code_2", 0, 15, "Second 4-bit parameter"),
];

const ABB_WELCOME: &[ParameterField] = &[
    int("source_address", 0, U16, "Source address"),
    int("destination_address", 0, U16, "Destination address"),
    flag("three_byte_address", false, "Use 3-byte address length"),
    flag("retransmission", false, "Message is a re-transmission"),
    int("message_type", 0, U8, "Message type"),
    opt_int("message_id", 0, U8, "Message ID"),
    bytes("data", ArrayLen::Between { min: 0, max: 7 }, false, "0-7 byte list"),
];

const RC_SWITCH_RAW: &[ParameterField] = &[pattern("code", Pattern::Binary, "Raw binary code to send")];

const RC_SWITCH_TYPE_A: &[ParameterField] = &[
    pattern("group", Pattern::Binary, "Binary string for the group"),
    pattern("device", Pattern::Binary, "Binary string for the device"),
    flag("state", true, "On/off state to send"),
];

const RC_SWITCH_TYPE_B: &[ParameterField] = &[
    int("address", 0, U8, "Address to send the command to"),
    int("channel", 0, U8, "Channel to send the command to"),
    flag("state", true, "On/off state to send"),
];

const RC_SWITCH_TYPE_C: &[ParameterField] = &[
    pattern("family", Pattern::FamilyLetter, "Family to send command to (a-p)"),
    int("group", 1, 4, "Group to send command to (1-4)"),
    int("device", 1, 4, "Device to send command to (1-4)"),
    flag("state", true, "On/off state to send"),
];

const RC_SWITCH_TYPE_D: &[ParameterField] = &[
    int("group", 1, 4, "Group to send command to (1-4)"),
    int("device", 1, 3, "Device to send command to (1-3)"),
    flag("state", true, "On/off state to send"),
];

const fn schema(protocol: ProtocolId, fields: &'static [ParameterField]) -> ParameterSchema {
    ParameterSchema { protocol, fields }
}

static SCHEMAS: [ParameterSchema; 37] = [
    schema(ProtocolId::Nec, NEC),
    schema(ProtocolId::Samsung, SAMSUNG),
    schema(ProtocolId::Samsung36, SAMSUNG36),
    schema(ProtocolId::Sony, SONY),
    schema(ProtocolId::Lg, LG),
    schema(ProtocolId::Panasonic, PANASONIC),
    schema(ProtocolId::Rc5, RC5),
    schema(ProtocolId::Rc6, RC6),
    schema(ProtocolId::Jvc, JVC),
    schema(ProtocolId::Pioneer, PIONEER),
    schema(ProtocolId::Coolix, COOLIX),
    schema(ProtocolId::Midea, MIDEA),
    schema(ProtocolId::Haier, HAIER),
    schema(ProtocolId::ToshibaAc, TOSHIBA_AC),
    schema(ProtocolId::Mirage, MIRAGE),
    schema(ProtocolId::Dish, DISH),
    schema(ProtocolId::Pronto, PRONTO),
    schema(ProtocolId::Raw, RAW),
    schema(ProtocolId::Aeha, AEHA),
    schema(ProtocolId::Beo4, BEO4),
    schema(ProtocolId::ByronSx, BYRONSX),
    schema(ProtocolId::CanalSat, CANALSAT),
    schema(ProtocolId::CanalSatLd, CANALSAT),
    schema(ProtocolId::Dooya, DOOYA),
    schema(ProtocolId::Drayton, DRAYTON),
    schema(ProtocolId::GoBox, GOBOX),
    schema(ProtocolId::KeeLoq, KEELOQ),
    schema(ProtocolId::MagiQuest, MAGIQUEST),
    schema(ProtocolId::Nexa, NEXA),
    schema(ProtocolId::Roomba, ROOMBA),
    schema(ProtocolId::Toto, TOTO),
    schema(ProtocolId::AbbWelcome, ABB_WELCOME),
    schema(ProtocolId::RcSwitchRaw, RC_SWITCH_RAW),
    schema(ProtocolId::RcSwitchTypeA, RC_SWITCH_TYPE_A),
    schema(ProtocolId::RcSwitchTypeB, RC_SWITCH_TYPE_B),
    schema(ProtocolId::RcSwitchTypeC, RC_SWITCH_TYPE_C),
    schema(ProtocolId::RcSwitchTypeD, RC_SWITCH_TYPE_D),
];
