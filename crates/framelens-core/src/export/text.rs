use std::fmt::Write;

use super::error::ExportError;
use super::export_timestamp;
use crate::ParsedReport;

const SEPARATOR_WIDTH: usize = 50;

pub(super) fn render(reports: &[ParsedReport]) -> Result<String, ExportError> {
    let mut out = String::new();
    for report in reports {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "Report - {}", export_timestamp(report)?);
        let _ = writeln!(out, "Device: {}", report.device_name);
        let _ = writeln!(out, "Raw Data: {}", report.raw_data_hex);
        out.push_str("Parsed Fields:\n");
        for field in &report.parsed_fields {
            let _ = writeln!(
                out,
                "  {} ({}): {}",
                field.meaning, field.field_name, field.display_value
            );
        }
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push('\n');
    }
    Ok(out)
}
