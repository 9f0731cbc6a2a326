//! FrameLens core library: schema-driven decoding of captured device frames.
//!
//! An operator describes the binary layout of a device protocol as a list of
//! [`FieldDef`] entries (offset, length, primitive type, endianness). Captured
//! byte buffers are decoded against that layout into an immutable
//! [`ParsedReport`]:
//!
//! - `hexcodec`: byte/hex-text conversions and hex-dump detection.
//! - `schema`: structural validation of a field list (advisory, never mutates).
//! - `decode`: per-field extraction (reader/parser/error layering).
//! - `report`: pipeline orchestration with per-field failure isolation.
//! - `import`: tolerant normalizer for externally authored schema JSON.
//! - `store`, `repository`, `export`, `capture`: the collection, its
//!   persistence, report export, and the capture hand-off.
//!
//! Invariants:
//! - Decoding is synchronous and side-effect free; callers append the
//!   resulting report to a device's history.
//! - One field's decode failure never removes or aborts another field.
//! - Field order in a report is the schema's field order.
//!
//! # Examples
//! ```
//! use framelens_core::{
//!     DeviceDefinition, Endianness, FieldDef, FieldType, FieldValue, PayloadFormat, build_report,
//! };
//!
//! let mut device = DeviceDefinition::new("Meter");
//! device.payload_format = PayloadFormat::Binary;
//! let fields = vec![FieldDef::new("voltage", 0, 2, FieldType::UInt16, Endianness::Big)];
//!
//! let report = build_report(&[0x01, 0x02], &device, &fields, time::OffsetDateTime::UNIX_EPOCH);
//! assert_eq!(report.parsed_fields[0].value, FieldValue::UInt16(258));
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use time::OffsetDateTime;

mod capture;
mod decode;
mod export;
mod hexcodec;
mod import;
mod report;
mod repository;
mod schema;
mod store;
mod tag;

pub use capture::CaptureSlot;
pub use decode::{DecodeError, decode_field};
pub use export::{ExportError, ExportFormat, export_reports, render_reports};
pub use hexcodec::{bytes_to_hex, hex_to_bytes, is_valid_hex_text};
pub use import::{ImportError, ImportedSchema, import_into, normalize_schema};
pub use report::build_report;
pub use repository::{DeviceRepository, RepositoryError};
pub use schema::{SUSPICIOUS_EXTENT, ValidationError, validate_fields};
pub use store::{DeviceStore, StoreError};

use tag::EnumTag;

/// How a captured buffer encodes its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// The buffer is ASCII text of hex digit pairs (optionally space/dash separated).
    #[default]
    HexDump,
    /// The buffer holds the raw bytes to decode.
    Binary,
}

/// Byte order of multi-byte numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Primitive type of a schema field (closed set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldType {
    #[default]
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    AsciiString,
    /// Raw bytes rendered as hex.
    Fixed,
}

impl FieldType {
    /// Natural width in bytes for numeric types; `None` for variable-width types.
    pub fn natural_width(self) -> Option<usize> {
        match self {
            FieldType::UInt8 | FieldType::Int8 => Some(1),
            FieldType::UInt16 | FieldType::Int16 => Some(2),
            FieldType::UInt32 | FieldType::Int32 | FieldType::Float32 => Some(4),
            FieldType::AsciiString | FieldType::Fixed => None,
        }
    }
}

impl EnumTag for PayloadFormat {
    const KIND: &'static str = "payload format";
    const ALL: &'static [Self] = &[PayloadFormat::HexDump, PayloadFormat::Binary];

    fn name(self) -> &'static str {
        match self {
            PayloadFormat::HexDump => "HexDump",
            PayloadFormat::Binary => "Binary",
        }
    }
}

impl EnumTag for Endianness {
    const KIND: &'static str = "endianness";
    const ALL: &'static [Self] = &[Endianness::Little, Endianness::Big];

    fn name(self) -> &'static str {
        match self {
            Endianness::Little => "Little",
            Endianness::Big => "Big",
        }
    }
}

impl EnumTag for FieldType {
    const KIND: &'static str = "field type";
    const ALL: &'static [Self] = &[
        FieldType::UInt8,
        FieldType::Int8,
        FieldType::UInt16,
        FieldType::Int16,
        FieldType::UInt32,
        FieldType::Int32,
        FieldType::Float32,
        FieldType::AsciiString,
        FieldType::Fixed,
    ];

    fn name(self) -> &'static str {
        match self {
            FieldType::UInt8 => "UInt8",
            FieldType::Int8 => "Int8",
            FieldType::UInt16 => "UInt16",
            FieldType::Int16 => "Int16",
            FieldType::UInt32 => "UInt32",
            FieldType::Int32 => "Int32",
            FieldType::Float32 => "Float32",
            FieldType::AsciiString => "AsciiString",
            FieldType::Fixed => "Fixed",
        }
    }
}

macro_rules! tag_impls {
    ($($tag:ty),+) => {
        $(
            impl fmt::Display for $tag {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }

            impl std::str::FromStr for $tag {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    <$tag>::from_text(s).ok_or_else(|| format!("unknown {}: {}", <$tag>::KIND, s))
                }
            }

            impl Serialize for $tag {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    tag::serialize_tag(self, serializer)
                }
            }

            impl<'de> Deserialize<'de> for $tag {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    tag::deserialize_tag(deserializer)
                }
            }
        )+
    };
}

tag_impls!(PayloadFormat, Endianness, FieldType);

fn lenient_field_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldType, D::Error> {
    tag::deserialize_tag_or(deserializer, FieldType::Fixed)
}

/// One schema entry: where a value lives in the frame and how to read it.
///
/// `offset` and `length` are signed so that malformed schemas survive
/// loading and can be reported by [`validate_fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDef {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    /// Display meaning; doubles as the canonical field name.
    #[serde(rename = "Meaning", alias = "meaning")]
    pub meaning: String,
    #[serde(rename = "Offset", alias = "offset")]
    pub offset: i64,
    #[serde(rename = "Length", alias = "length")]
    pub length: i64,
    #[serde(
        rename = "Type",
        alias = "type",
        deserialize_with = "lenient_field_type"
    )]
    pub field_type: FieldType,
    #[serde(rename = "Endian", alias = "endian")]
    pub endian: Endianness,
    /// Diagnostic hint only; never enforced.
    #[serde(rename = "ExpectedHex", alias = "expectedHex")]
    pub expected_hex: String,
}

impl FieldDef {
    pub fn new(
        meaning: impl Into<String>,
        offset: i64,
        length: i64,
        field_type: FieldType,
        endian: Endianness,
    ) -> Self {
        let meaning = meaning.into();
        Self {
            name: meaning.clone(),
            meaning,
            offset,
            length,
            field_type,
            endian,
            expected_hex: String::new(),
        }
    }

    /// Inclusive byte range `[start, end]` covered by this field.
    /// Saturates instead of overflowing on extreme offsets.
    pub fn byte_range(&self) -> (i64, i64) {
        (
            self.offset,
            self.offset.saturating_add(self.length.saturating_sub(1)),
        )
    }
}

/// Decoded value of one field, or the reason it could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    Float32(f32),
    String(String),
    /// Space-separated uppercase hex of the raw slice.
    HexBytes(String),
    DecodeError(String),
}

impl FieldValue {
    pub fn is_error(&self) -> bool {
        matches!(self, FieldValue::DecodeError(_))
    }

    /// Text suitable for direct rendering.
    pub fn display(&self) -> String {
        match self {
            FieldValue::UInt8(v) => v.to_string(),
            FieldValue::Int8(v) => v.to_string(),
            FieldValue::UInt16(v) => v.to_string(),
            FieldValue::Int16(v) => v.to_string(),
            FieldValue::UInt32(v) => v.to_string(),
            FieldValue::Int32(v) => v.to_string(),
            FieldValue::Float32(v) => format!("{v:.6}"),
            FieldValue::String(s) | FieldValue::HexBytes(s) => s.clone(),
            FieldValue::DecodeError(message) => format!("{ERROR_PREFIX}{message}"),
        }
    }

    /// Rebuilds a value from its persisted form (`ParsedValue` + `DisplayValue`).
    fn from_stored(field_type: FieldType, value: &Value, display: &str) -> Self {
        if value.is_null() {
            if let Some(message) = display.strip_prefix(ERROR_PREFIX) {
                return FieldValue::DecodeError(message.to_string());
            }
        }
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => display.to_string(),
        };
        let restored = match field_type {
            FieldType::UInt8 => text.parse().ok().map(FieldValue::UInt8),
            FieldType::Int8 => text.parse().ok().map(FieldValue::Int8),
            FieldType::UInt16 => text.parse().ok().map(FieldValue::UInt16),
            FieldType::Int16 => text.parse().ok().map(FieldValue::Int16),
            FieldType::UInt32 => text.parse().ok().map(FieldValue::UInt32),
            FieldType::Int32 => text.parse().ok().map(FieldValue::Int32),
            FieldType::Float32 => match value.as_f64() {
                Some(v) => Some(FieldValue::Float32(v as f32)),
                None => text.parse().ok().map(FieldValue::Float32),
            },
            FieldType::AsciiString => Some(FieldValue::String(text.clone())),
            FieldType::Fixed => Some(FieldValue::HexBytes(text.clone())),
        };
        restored.unwrap_or_else(|| FieldValue::DecodeError(format!("unreadable stored value '{text}'")))
    }
}

const ERROR_PREFIX: &str = "Error: ";

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::UInt8(v) => serializer.serialize_u8(*v),
            FieldValue::Int8(v) => serializer.serialize_i8(*v),
            FieldValue::UInt16(v) => serializer.serialize_u16(*v),
            FieldValue::Int16(v) => serializer.serialize_i16(*v),
            FieldValue::UInt32(v) => serializer.serialize_u32(*v),
            FieldValue::Int32(v) => serializer.serialize_i32(*v),
            FieldValue::Float32(v) => serializer.serialize_f32(*v),
            FieldValue::String(s) | FieldValue::HexBytes(s) => serializer.serialize_str(s),
            FieldValue::DecodeError(_) => serializer.serialize_none(),
        }
    }
}

/// One field's outcome within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParsedFieldRecord")]
pub struct ParsedField {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Meaning")]
    pub meaning: String,
    #[serde(rename = "ParsedValue")]
    pub value: FieldValue,
    #[serde(rename = "DisplayValue")]
    pub display_value: String,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Length")]
    pub length: i64,
    #[serde(rename = "Type")]
    pub field_type: FieldType,
}

impl ParsedField {
    /// Pairs a decoded value with the definition that produced it.
    pub fn from_def(field: &FieldDef, value: FieldValue) -> Self {
        Self {
            field_name: field.name.clone(),
            meaning: field.meaning.clone(),
            display_value: value.display(),
            value,
            offset: field.offset,
            length: field.length,
            field_type: field.field_type,
        }
    }

    pub fn is_error(&self) -> bool {
        self.value.is_error()
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ParsedFieldRecord {
    #[serde(rename = "FieldName", alias = "fieldName")]
    field_name: String,
    #[serde(rename = "Meaning", alias = "meaning")]
    meaning: String,
    #[serde(rename = "ParsedValue", alias = "parsedValue")]
    value: Value,
    #[serde(rename = "DisplayValue", alias = "displayValue")]
    display_value: String,
    #[serde(rename = "Offset", alias = "offset")]
    offset: i64,
    #[serde(rename = "Length", alias = "length")]
    length: i64,
    #[serde(
        rename = "Type",
        alias = "type",
        deserialize_with = "lenient_field_type"
    )]
    field_type: FieldType,
}

impl From<ParsedFieldRecord> for ParsedField {
    fn from(record: ParsedFieldRecord) -> Self {
        let value = FieldValue::from_stored(record.field_type, &record.value, &record.display_value);
        Self {
            field_name: record.field_name,
            meaning: record.meaning,
            value,
            display_value: record.display_value,
            offset: record.offset,
            length: record.length,
            field_type: record.field_type,
        }
    }
}

/// Immutable result of one decode event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    #[serde(rename = "Timestamp", alias = "timestamp", with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Hex rendering of the decoded buffer (after hex-dump unwrap, if any).
    #[serde(rename = "RawDataHex", alias = "rawDataHex", default)]
    pub raw_data_hex: String,
    #[serde(rename = "ParsedFields", alias = "parsedFields", default)]
    pub parsed_fields: Vec<ParsedField>,
    /// Snapshot of the device name at decode time.
    #[serde(rename = "DeviceName", alias = "deviceName", default)]
    pub device_name: String,
}

impl ParsedReport {
    pub fn failed_fields(&self) -> impl Iterator<Item = &ParsedField> {
        self.parsed_fields.iter().filter(|field| field.is_error())
    }
}

/// A named protocol schema plus its decode history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DeviceRecord")]
pub struct DeviceDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PayloadFormat")]
    pub payload_format: PayloadFormat,
    #[serde(rename = "Endian")]
    pub endian: Endianness,
    #[serde(rename = "Fields")]
    pub fields: Vec<FieldDef>,
    /// Oldest first.
    #[serde(rename = "Reports")]
    pub reports: Vec<ParsedReport>,
}

impl DeviceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload_format: PayloadFormat::HexDump,
            endian: Endianness::Little,
            fields: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Replaces the schema. Each field's name is set to its meaning and its
    /// endianness to the device default.
    pub fn apply_fields(&mut self, fields: Vec<FieldDef>) {
        self.fields = fields
            .into_iter()
            .map(|mut field| {
                field.name = field.meaning.clone();
                field.endian = self.endian;
                field
            })
            .collect();
    }

    pub fn reports_newest_first(&self) -> impl Iterator<Item = &ParsedReport> {
        self.reports.iter().rev()
    }
}

#[derive(Deserialize)]
struct DeviceRecord {
    #[serde(rename = "Name", alias = "name", default = "default_device_name")]
    name: String,
    #[serde(rename = "PayloadFormat", alias = "payloadFormat", default)]
    payload_format: Option<PayloadFormat>,
    #[serde(rename = "InputIsHexDump", alias = "inputIsHexDump", default)]
    input_is_hex_dump: Option<bool>,
    #[serde(rename = "Endian", alias = "endian", default)]
    endian: Endianness,
    #[serde(rename = "Fields", alias = "fields", default)]
    fields: Vec<FieldDef>,
    #[serde(rename = "Reports", alias = "reports", default)]
    reports: Vec<ParsedReport>,
}

fn default_device_name() -> String {
    "New Device".to_string()
}

impl From<DeviceRecord> for DeviceDefinition {
    fn from(record: DeviceRecord) -> Self {
        // Stores written before `PayloadFormat` existed only carry the flag.
        let payload_format = match (record.payload_format, record.input_is_hex_dump) {
            (Some(format), _) => format,
            (None, Some(true)) => PayloadFormat::HexDump,
            (None, _) => PayloadFormat::default(),
        };
        Self {
            name: record.name,
            payload_format,
            endian: record.endian,
            fields: record.fields,
            reports: record.reports,
        }
    }
}
