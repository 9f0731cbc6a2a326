use super::error::DecodeError;
use super::reader::{FieldReader, le_window};
use crate::hexcodec::bytes_to_hex;
use crate::{Endianness, FieldDef, FieldType, FieldValue, ParsedField};

/// Decodes one field of `data`. Failures are captured in the returned field.
///
/// # Examples
/// ```
/// use framelens_core::{Endianness, FieldDef, FieldType, FieldValue, decode_field};
///
/// let field = FieldDef::new("level", 0, 2, FieldType::UInt16, Endianness::Little);
/// let parsed = decode_field(&[0x01, 0x02], &field);
/// assert_eq!(parsed.value, FieldValue::UInt16(513));
/// assert_eq!(parsed.display_value, "513");
/// ```
pub fn decode_field(data: &[u8], field: &FieldDef) -> ParsedField {
    let value = decode_value(data, field).unwrap_or_else(|err| FieldValue::DecodeError(err.to_string()));
    ParsedField::from_def(field, value)
}

fn decode_value(data: &[u8], field: &FieldDef) -> Result<FieldValue, DecodeError> {
    let bytes = FieldReader::new(data).read_slice(field)?;
    let endian = field.endian;
    match field.field_type {
        FieldType::UInt8 => decode_uint8(bytes),
        FieldType::Int8 => decode_int8(bytes),
        FieldType::UInt16 => decode_uint16(bytes, endian),
        FieldType::Int16 => decode_int16(bytes, endian),
        FieldType::UInt32 => decode_uint32(bytes, endian),
        FieldType::Int32 => decode_int32(bytes, endian),
        FieldType::Float32 => decode_float32(bytes, endian),
        FieldType::AsciiString => Ok(decode_ascii(bytes)),
        FieldType::Fixed => Ok(FieldValue::HexBytes(bytes_to_hex(bytes))),
    }
}

fn decode_uint8(bytes: &[u8]) -> Result<FieldValue, DecodeError> {
    let [b] = le_window::<1>(bytes, Endianness::Little, FieldType::UInt8)?;
    Ok(FieldValue::UInt8(b))
}

fn decode_int8(bytes: &[u8]) -> Result<FieldValue, DecodeError> {
    let [b] = le_window::<1>(bytes, Endianness::Little, FieldType::Int8)?;
    Ok(FieldValue::Int8(b as i8))
}

fn decode_uint16(bytes: &[u8], endian: Endianness) -> Result<FieldValue, DecodeError> {
    let window = le_window(bytes, endian, FieldType::UInt16)?;
    Ok(FieldValue::UInt16(u16::from_le_bytes(window)))
}

fn decode_int16(bytes: &[u8], endian: Endianness) -> Result<FieldValue, DecodeError> {
    let window = le_window(bytes, endian, FieldType::Int16)?;
    Ok(FieldValue::Int16(i16::from_le_bytes(window)))
}

fn decode_uint32(bytes: &[u8], endian: Endianness) -> Result<FieldValue, DecodeError> {
    let window = le_window(bytes, endian, FieldType::UInt32)?;
    Ok(FieldValue::UInt32(u32::from_le_bytes(window)))
}

fn decode_int32(bytes: &[u8], endian: Endianness) -> Result<FieldValue, DecodeError> {
    let window = le_window(bytes, endian, FieldType::Int32)?;
    Ok(FieldValue::Int32(i32::from_le_bytes(window)))
}

fn decode_float32(bytes: &[u8], endian: Endianness) -> Result<FieldValue, DecodeError> {
    let window = le_window(bytes, endian, FieldType::Float32)?;
    Ok(FieldValue::Float32(f32::from_le_bytes(window)))
}

// Non-ASCII bytes become '?'; only trailing NULs are dropped.
fn decode_ascii(bytes: &[u8]) -> FieldValue {
    let text: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    FieldValue::String(text.trim_end_matches('\0').to_string())
}
