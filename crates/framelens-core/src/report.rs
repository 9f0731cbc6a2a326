use std::borrow::Cow;

use time::OffsetDateTime;

use crate::decode::decode_field;
use crate::hexcodec::{bytes_to_hex, hex_to_bytes, is_valid_hex_text};
use crate::{DeviceDefinition, FieldDef, ParsedReport, PayloadFormat};

/// Decodes `buffer` against `fields` into one report.
///
/// For [`PayloadFormat::HexDump`] devices the buffer is first unwrapped when
/// it is ASCII hex text; otherwise it is decoded as-is. Every field yields a
/// [`ParsedField`](crate::ParsedField), in schema order, whether or not it
/// decoded. The caller owns appending the report to the device history.
///
/// # Examples
/// ```
/// use framelens_core::{DeviceDefinition, Endianness, FieldDef, FieldType, build_report};
///
/// let device = DeviceDefinition::new("Sensor"); // hex-dump payloads by default
/// let fields = vec![
///     FieldDef::new("id", 0, 1, FieldType::UInt8, Endianness::Little),
///     FieldDef::new("missing", 8, 1, FieldType::UInt8, Endianness::Little),
/// ];
/// let report = build_report(b"2A 00", &device, &fields, time::OffsetDateTime::UNIX_EPOCH);
/// assert_eq!(report.raw_data_hex, "2A 00");
/// assert_eq!(report.parsed_fields[0].display_value, "42");
/// assert!(report.parsed_fields[1].is_error());
/// ```
pub fn build_report(
    buffer: &[u8],
    device: &DeviceDefinition,
    fields: &[FieldDef],
    now: OffsetDateTime,
) -> ParsedReport {
    let data = match device.payload_format {
        PayloadFormat::HexDump => unwrap_hex_dump(buffer),
        PayloadFormat::Binary => Cow::Borrowed(buffer),
    };

    let parsed_fields: Vec<_> = fields
        .iter()
        .map(|field| {
            let parsed = decode_field(&data, field);
            if parsed.is_error() {
                tracing::debug!(
                    device = %device.name,
                    field = %field.meaning,
                    error = %parsed.display_value,
                    "field decode failed"
                );
            }
            parsed
        })
        .collect();

    tracing::debug!(
        device = %device.name,
        bytes = data.len(),
        fields = parsed_fields.len(),
        failed = parsed_fields.iter().filter(|f| f.is_error()).count(),
        "report assembled"
    );

    ParsedReport {
        timestamp: now,
        raw_data_hex: bytes_to_hex(&data),
        parsed_fields,
        device_name: device.name.clone(),
    }
}

/// Best effort: non-ASCII or non-hex buffers are returned unchanged.
fn unwrap_hex_dump(buffer: &[u8]) -> Cow<'_, [u8]> {
    let text = match std::str::from_utf8(buffer) {
        Ok(text) if text.is_ascii() => text,
        _ => {
            tracing::debug!("hex-dump unwrap skipped: buffer is not ASCII");
            return Cow::Borrowed(buffer);
        }
    };
    if !is_valid_hex_text(text) {
        tracing::debug!("hex-dump unwrap skipped: buffer is not hex text");
        return Cow::Borrowed(buffer);
    }
    let unwrapped = hex_to_bytes(text);
    tracing::debug!(
        from = buffer.len(),
        to = unwrapped.len(),
        "hex-dump unwrap applied"
    );
    Cow::Owned(unwrapped)
}
