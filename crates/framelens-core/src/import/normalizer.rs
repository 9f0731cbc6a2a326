use serde_json::{Map, Value};

use super::aliases::{
    ENDIANNESS_ALIASES, ENDIANNESS_KEYS, FIELD_ARRAY_KEYS, FIELD_TYPE_ALIASES, LENGTH_KEYS,
    MEANING_KEYS, OFFSET_KEYS, PAYLOAD_FORMAT_ALIASES, PAYLOAD_FORMAT_KEYS, TYPE_KEYS, lookup,
};
use super::error::ImportError;
use crate::tag::EnumTag;
use crate::{DeviceDefinition, Endianness, FieldDef, FieldType, PayloadFormat};

/// Canonical view of an imported schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSchema {
    pub fields: Vec<FieldDef>,
    /// Recognized top-level payload format hint, if any.
    pub payload_format: Option<PayloadFormat>,
    /// Recognized top-level endianness hint, if any.
    pub endianness: Option<Endianness>,
}

/// Parses a schema document of unknown shape.
///
/// # Examples
/// ```
/// use framelens_core::{FieldType, normalize_schema};
///
/// let schema = normalize_schema(r#"{"packet_structure": [
///     {"name": "id", "offset": "0", "length": 1, "type": "u8"},
///     {"name": "blob", "offset": 1, "length": 3, "type": "weird_unit"}
/// ]}"#)?;
/// assert_eq!(schema.fields[0].field_type, FieldType::UInt8);
/// assert_eq!(schema.fields[1].field_type, FieldType::Fixed);
/// # Ok::<(), framelens_core::ImportError>(())
/// ```
pub fn normalize_schema(json: &str) -> Result<ImportedSchema, ImportError> {
    let root: Value = serde_json::from_str(json)?;

    let (payload_format, endianness) = match &root {
        Value::Object(map) => (
            first_string(map, PAYLOAD_FORMAT_KEYS)
                .and_then(|text| lookup(PAYLOAD_FORMAT_ALIASES, &text)),
            first_string(map, ENDIANNESS_KEYS).and_then(|text| lookup(ENDIANNESS_ALIASES, &text)),
        ),
        _ => (None, None),
    };

    let items = locate_field_array(&root)?;
    let endian = endianness.unwrap_or_default();
    let fields: Vec<FieldDef> = items.iter().map(|item| normalize_item(item, endian)).collect();
    if fields.is_empty() {
        return Err(ImportError::NoUsableFields);
    }

    tracing::debug!(fields = fields.len(), "schema document normalized");
    Ok(ImportedSchema {
        fields,
        payload_format,
        endianness,
    })
}

/// Imports a schema document into `device`, replacing its fields.
///
/// Recognized hints are applied to the device first, so imported fields take
/// the device's (possibly updated) endianness. The device is untouched when
/// the import fails. Returns the number of imported fields.
pub fn import_into(json: &str, device: &mut DeviceDefinition) -> Result<usize, ImportError> {
    let schema = normalize_schema(json)?;
    if let Some(format) = schema.payload_format {
        device.payload_format = format;
    }
    if let Some(endian) = schema.endianness {
        device.endian = endian;
    }
    let count = schema.fields.len();
    device.apply_fields(schema.fields);
    tracing::info!(device = %device.name, fields = count, "schema imported");
    Ok(count)
}

fn locate_field_array(root: &Value) -> Result<&[Value], ImportError> {
    let map = match root {
        Value::Array(items) => return Ok(items.as_slice()),
        Value::Object(map) => map,
        _ => return Err(ImportError::NoFieldsArray),
    };
    let (key, value) = FIELD_ARRAY_KEYS
        .iter()
        .find_map(|key| map.get(*key).map(|value| (*key, value)))
        .ok_or(ImportError::NoFieldsArray)?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(ImportError::NotAnArray { key })
}

fn normalize_item(item: &Value, endian: Endianness) -> FieldDef {
    let empty = Map::new();
    let map = item.as_object().unwrap_or(&empty);

    let meaning = first_string(map, MEANING_KEYS).unwrap_or_default();
    let offset = first_int(map, OFFSET_KEYS).unwrap_or(0);
    let length = first_int(map, LENGTH_KEYS).unwrap_or(0);
    let field_type = match first_string(map, TYPE_KEYS) {
        Some(text) => parse_field_type(&text).unwrap_or_else(|| {
            if !text.trim().is_empty() {
                tracing::warn!(field = %meaning, field_type = %text, "unknown field type, using Fixed");
            }
            FieldType::Fixed
        }),
        None => FieldType::Fixed,
    };

    FieldDef::new(meaning, offset, length, field_type, endian)
}

/// Enum name or index first, then the alias table.
fn parse_field_type(text: &str) -> Option<FieldType> {
    if text.trim().is_empty() {
        return None;
    }
    FieldType::from_text(text).or_else(|| lookup(FIELD_TYPE_ALIASES, text))
}

// First key present wins, whatever its value; non-strings are rendered as JSON text.
fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        map.get(*key).map(|value| match value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    })
}

// First key holding a 32-bit integer (or one written as a string) wins;
// values outside the i32 range count as absent.
fn first_int(map: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| {
        let value = match map.get(*key)? {
            Value::Number(number) => number.as_i64().and_then(|v| i32::try_from(v).ok()),
            Value::String(text) => text.trim().parse::<i32>().ok(),
            _ => None,
        };
        value.map(i64::from)
    })
}

#[cfg(test)]
mod tests {
    use super::{import_into, normalize_schema};
    use crate::import::error::ImportError;
    use crate::{DeviceDefinition, Endianness, FieldType, PayloadFormat};

    #[test]
    fn bare_array_root() {
        let schema = normalize_schema(
            r#"[{"Meaning": "temp", "Offset": 2, "Length": 2, "Type": "Int16"}]"#,
        )
        .unwrap();
        assert_eq!(schema.fields.len(), 1);
        let field = &schema.fields[0];
        assert_eq!(field.meaning, "temp");
        assert_eq!(field.name, "temp");
        assert_eq!((field.offset, field.length), (2, 2));
        assert_eq!(field.field_type, FieldType::Int16);
        assert_eq!(schema.payload_format, None);
    }

    #[test]
    fn array_keys_are_tried_in_order() {
        let schema = normalize_schema(
            r#"{"packetStructure": [{"name": "late"}], "ParsedFields": [{"name": "early"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.fields[0].meaning, "early");
    }

    #[test]
    fn type_strings_are_normalized() {
        let schema = normalize_schema(
            r#"[
                {"type": "UINT32"}, {"type": "s8"}, {"FieldType": "integer"},
                {"fieldType": "f32"}, {"type": "string"}, {"type": "bytes"},
                {"type": "byte"}, {"type": 2}, {"type": ""}, {}
            ]"#,
        )
        .unwrap();
        let types: Vec<_> = schema.fields.iter().map(|f| f.field_type).collect();
        assert_eq!(
            types,
            [
                FieldType::UInt32,
                FieldType::Int8,
                FieldType::Int32,
                FieldType::Float32,
                FieldType::AsciiString,
                FieldType::Fixed,
                FieldType::UInt8,
                FieldType::UInt16,
                FieldType::Fixed,
                FieldType::Fixed,
            ]
        );
    }

    #[test]
    fn unknown_type_falls_back_to_fixed() {
        let schema =
            normalize_schema(r#"[{"name": "x", "length": 4, "type": "weird_unit"}]"#).unwrap();
        assert_eq!(schema.fields[0].field_type, FieldType::Fixed);
    }

    #[test]
    fn numbers_accept_strings_and_fall_through_keys() {
        let schema = normalize_schema(
            r#"[{"Offset": "oops", "offset": " 7 ", "Length": 1.5, "length": "3"}]"#,
        )
        .unwrap();
        assert_eq!(schema.fields[0].offset, 7);
        assert_eq!(schema.fields[0].length, 3);
    }

    #[test]
    fn out_of_range_numbers_are_treated_as_missing() {
        let schema = normalize_schema(
            r#"[{"name": "far", "offset": 9223372036854775807, "length": 2, "type": "u16"},
                {"name": "big", "Offset": "4294967296", "offset": 8, "length": -3000000000}]"#,
        )
        .unwrap();
        assert_eq!((schema.fields[0].offset, schema.fields[0].length), (0, 2));
        assert_eq!((schema.fields[1].offset, schema.fields[1].length), (8, 0));
        assert!(!crate::validate_fields(&schema.fields).is_empty());
    }

    #[test]
    fn meaning_prefers_meaning_over_name() {
        let schema = normalize_schema(r#"[{"name": "n", "Meaning": "m"}, {"Name": 5}]"#).unwrap();
        assert_eq!(schema.fields[0].meaning, "m");
        assert_eq!(schema.fields[1].meaning, "5");
    }

    #[test]
    fn non_object_items_use_defaults() {
        let schema = normalize_schema(r#"{"Fields": [42]}"#).unwrap();
        let field = &schema.fields[0];
        assert_eq!(field.meaning, "");
        assert_eq!((field.offset, field.length), (0, 0));
        assert_eq!(field.field_type, FieldType::Fixed);
    }

    #[test]
    fn hints_are_read_and_unrecognized_ones_ignored() {
        let schema = normalize_schema(
            r#"{"format": "bin", "byte_order": "BigEndian", "Fields": [{"name": "a"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.payload_format, Some(PayloadFormat::Binary));
        assert_eq!(schema.endianness, Some(Endianness::Big));
        assert_eq!(schema.fields[0].endian, Endianness::Big);

        let schema =
            normalize_schema(r#"{"payload_format": "morse", "endian": "middle", "Fields": [{}]}"#)
                .unwrap();
        assert_eq!(schema.payload_format, None);
        assert_eq!(schema.endianness, None);
    }

    #[test]
    fn missing_array_is_an_error() {
        let err = normalize_schema(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::NoFieldsArray));
        let err = normalize_schema("17").unwrap_err();
        assert!(matches!(err, ImportError::NoFieldsArray));
    }

    #[test]
    fn array_keys_are_case_sensitive() {
        let err = normalize_schema(r#"{"fields": [{"name": "a", "offset": 0, "length": 1, "type": "u8"}]}"#)
            .unwrap_err();
        assert!(matches!(err, ImportError::NoFieldsArray));
    }

    #[test]
    fn empty_or_non_array_is_an_error() {
        assert!(matches!(
            normalize_schema("[]").unwrap_err(),
            ImportError::NoUsableFields
        ));
        assert!(matches!(
            normalize_schema(r#"{"Fields": {"a": 1}}"#).unwrap_err(),
            ImportError::NotAnArray { key: "Fields" }
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            normalize_schema("{not json").unwrap_err(),
            ImportError::InvalidJson(_)
        ));
    }

    #[test]
    fn import_applies_hints_then_fields() {
        let mut device = DeviceDefinition::new("Gauge");
        let count = import_into(
            r#"{"payloadFormat": "binary", "endianness": "big",
                "Fields": [{"name": "level", "offset": 0, "length": 2, "type": "u16"}]}"#,
            &mut device,
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(device.payload_format, PayloadFormat::Binary);
        assert_eq!(device.endian, Endianness::Big);
        assert_eq!(device.fields[0].endian, Endianness::Big);
        assert_eq!(device.fields[0].name, "level");
    }

    #[test]
    fn failed_import_leaves_device_untouched() {
        let mut device = DeviceDefinition::new("Gauge");
        let before = device.clone();
        assert!(import_into(r#"{"format": "binary"}"#, &mut device).is_err());
        assert_eq!(device, before);
    }
}
