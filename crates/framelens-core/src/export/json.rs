use serde::Serialize;
use time::OffsetDateTime;

use super::error::ExportError;
use crate::{FieldType, FieldValue, ParsedReport};

// `FieldName` is left out on purpose: `Meaning` is the exported name.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportedReport<'a> {
    device_name: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    raw_data_hex: &'a str,
    parsed_fields: Vec<ExportedField<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportedField<'a> {
    meaning: &'a str,
    parsed_value: &'a FieldValue,
    display_value: &'a str,
    offset: i64,
    length: i64,
    #[serde(rename = "Type")]
    field_type: FieldType,
}

pub(super) fn render(reports: &[ParsedReport]) -> Result<String, ExportError> {
    let exported: Vec<_> = reports
        .iter()
        .map(|report| ExportedReport {
            device_name: &report.device_name,
            timestamp: report.timestamp,
            raw_data_hex: &report.raw_data_hex,
            parsed_fields: report
                .parsed_fields
                .iter()
                .map(|field| ExportedField {
                    meaning: &field.meaning,
                    parsed_value: &field.value,
                    display_value: &field.display_value,
                    offset: field.offset,
                    length: field.length,
                    field_type: field.field_type,
                })
                .collect(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::render;
    use crate::export::fixtures;

    #[test]
    fn exports_expected_shape() {
        let rendered = render(&[fixtures::report()]).expect("render");
        let value: Value = serde_json::from_str(&rendered).expect("json");
        let report = &value[0];
        assert_eq!(report["DeviceName"], "Gauge");
        assert_eq!(report["Timestamp"], "2024-03-09T14:05:07Z");
        assert_eq!(report["RawDataHex"], "2A 00 00 C0 3F");
        assert_eq!(
            report["ParsedFields"][0],
            json!({
                "Meaning": "id",
                "ParsedValue": 42,
                "DisplayValue": "42",
                "Offset": 0,
                "Length": 1,
                "Type": "UInt8"
            })
        );
        assert!(report["ParsedFields"][0].get("FieldName").is_none());
        assert!(report["ParsedFields"][1]["ParsedValue"].is_null());
    }

    #[test]
    fn empty_history_is_an_empty_array() {
        assert_eq!(render(&[]).expect("render"), "[]");
    }
}
