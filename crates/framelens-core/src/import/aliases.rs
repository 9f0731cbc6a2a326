//! Alias tables for loosely structured schema documents.
//!
//! Key lists are matched literally and in order; the first key present wins.
//! Value tables are matched after trimming and lowercasing.

use crate::{Endianness, FieldType, PayloadFormat};

pub const FIELD_ARRAY_KEYS: &[&str] = &[
    "Fields",
    "ParsedFields",
    "parsedFields",
    "packet_structure",
    "packetStructure",
    "packet-structure",
];

pub const PAYLOAD_FORMAT_KEYS: &[&str] = &["payload_format", "payloadFormat", "format"];
pub const ENDIANNESS_KEYS: &[&str] = &["endianness", "endian", "byte_order"];

pub const MEANING_KEYS: &[&str] = &["Meaning", "meaning", "Name", "name"];
pub const OFFSET_KEYS: &[&str] = &["Offset", "offset"];
pub const LENGTH_KEYS: &[&str] = &["Length", "length"];
pub const TYPE_KEYS: &[&str] = &["Type", "type", "FieldType", "fieldType"];

pub const FIELD_TYPE_ALIASES: &[(&str, FieldType)] = &[
    ("u8", FieldType::UInt8),
    ("byte", FieldType::UInt8),
    ("uint", FieldType::UInt8),
    ("s8", FieldType::Int8),
    ("u16", FieldType::UInt16),
    ("s16", FieldType::Int16),
    ("u32", FieldType::UInt32),
    ("s32", FieldType::Int32),
    ("int", FieldType::Int32),
    ("integer", FieldType::Int32),
    ("float", FieldType::Float32),
    ("f32", FieldType::Float32),
    ("ascii", FieldType::AsciiString),
    ("string", FieldType::AsciiString),
    ("bytes", FieldType::Fixed),
];

pub const PAYLOAD_FORMAT_ALIASES: &[(&str, PayloadFormat)] = &[
    ("hexdump", PayloadFormat::HexDump),
    ("hex", PayloadFormat::HexDump),
    ("hex_dump", PayloadFormat::HexDump),
    ("binary", PayloadFormat::Binary),
    ("bin", PayloadFormat::Binary),
];

pub const ENDIANNESS_ALIASES: &[(&str, Endianness)] = &[
    ("big", Endianness::Big),
    ("big_endian", Endianness::Big),
    ("bigendian", Endianness::Big),
    ("little", Endianness::Little),
    ("little_endian", Endianness::Little),
    ("littleendian", Endianness::Little),
];

pub fn lookup<T: Copy>(table: &[(&str, T)], text: &str) -> Option<T> {
    let key = text.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, value)| *value)
}
