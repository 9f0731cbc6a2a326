use super::error::ExportError;
use super::export_timestamp;
use crate::ParsedReport;

const HEADER: &str = "Timestamp,Device,Raw Data,Field Name,Field Meaning,Parsed Value,Offset,Length,Type";

/// One row per parsed field. Raw data is always quoted; other cells only
/// when they contain a delimiter, quote, or line break.
pub(super) fn render(reports: &[ParsedReport]) -> Result<String, ExportError> {
    let mut out = String::from(HEADER);
    out.push('\n');
    for report in reports {
        let timestamp = export_timestamp(report)?;
        for field in &report.parsed_fields {
            let row = [
                timestamp.clone(),
                cell(&report.device_name),
                quoted(&report.raw_data_hex),
                cell(&field.field_name),
                cell(&field.meaning),
                cell(&field.display_value),
                field.offset.to_string(),
                field.length.to_string(),
                field.field_type.to_string(),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
    }
    Ok(out)
}

fn cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
